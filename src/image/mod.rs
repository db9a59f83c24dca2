pub mod gray;
pub mod io;
pub mod plate;
pub mod rgb;
pub mod traits;
pub mod transform;
pub mod u8;

pub use self::gray::GrayImageU8;
pub use self::plate::{PixelFormat, PlateImage};
pub use self::rgb::{rgb_to_hsb, Hsb, RgbImageU8};
pub use self::traits::{ImageView, Rows};
pub use self::u8::ImageU8;
