//! HiROM address translation
//!
//! Banks `C0..FF` mirror the first 4 MiB of the image; ExHiROM data past
//! 4 MiB is addressed directly through banks `40..7D`.

/// Base of the HiROM mirror in the console's address space
pub const HIROM_BASE: usize = 0xC0_0000;
/// Size of the region reachable through the HiROM mirror
pub const HIROM_SIZE: usize = 0x40_0000;
/// Size of one bank
pub const BANK_SIZE: usize = 0x1_0000;

/// Banked (console) address to a ROM-file offset
pub fn to_local(banked: usize) -> usize {
    if banked >= HIROM_BASE {
        banked - HIROM_BASE
    } else {
        banked
    }
}

/// ROM-file offset to the banked address stored in pointers
pub fn to_banked(local: usize) -> usize {
    if local >= HIROM_SIZE {
        local
    } else {
        local + HIROM_BASE
    }
}

/// First offset of the bank containing `addr`
pub fn bank_start(addr: usize) -> usize {
    addr & !(BANK_SIZE - 1)
}
