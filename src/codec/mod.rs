pub mod reader;
pub mod writer;
pub mod sprite_list;

pub use reader::BinaryReader;
pub use writer::BinaryWriter;
pub use sprite_list::{
    SpritePlacement,
    decode_sprite_list, encode_sprite_list, encoded_len,
};
