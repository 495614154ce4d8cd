//! Source photo loading. The only place the library touches the filesystem
//! besides document persistence.

use std::sync::Arc;

use crate::error::{LetterhuntError, LhResult};

/// Decoded source photo in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedPhoto {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

pub fn decode_photo(bytes: &[u8]) -> LhResult<PreparedPhoto> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| LetterhuntError::image_load(format!("decode image: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedPhoto {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

pub fn load_photo(path: &str) -> LhResult<PreparedPhoto> {
    let bytes = std::fs::read(path)
        .map_err(|e| LetterhuntError::image_load(format!("read '{path}': {e}")))?;
    decode_photo(&bytes)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
