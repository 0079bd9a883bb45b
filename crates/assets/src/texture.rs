use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Width and height of the placeholder texture.
pub const PLACEHOLDER_SIZE: u32 = 32;
/// Edge length of one checkerboard cell.
pub const PLACEHOLDER_CELL: u32 = 8;

const MAGENTA: [u8; 4] = [255, 0, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

/// Shared handle to a resident texture. Its address never changes once issued.
pub type TextureHandle = Arc<Texture>;

/// Where a texture's pixel data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureState {
    /// Allocated at the header's size; pixels are still zeroed.
    Pending,
    /// Pixels are the decoded asset.
    Resident,
    /// Pixels are the placeholder checkerboard.
    Placeholder,
}

impl TextureState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Pending,
            1 => Self::Resident,
            _ => Self::Placeholder,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Resident => 1,
            Self::Placeholder => 2,
        }
    }
}

#[derive(Debug)]
struct Pixels {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// CPU-side stand-in for a GPU texture: RGBA8 pixels plus load state.
///
/// The pipeline fills pixels in place, so handles given out before the
/// upload observe the data as soon as it lands.
#[derive(Debug)]
pub struct Texture {
    key: String,
    pixels: RwLock<Pixels>,
    state: AtomicU8,
}

impl Texture {
    /// Final-size texture with zeroed pixels.
    pub(crate) fn pending(key: &str, width: u32, height: u32) -> Self {
        Self {
            key: key.to_string(),
            pixels: RwLock::new(Pixels {
                width,
                height,
                rgba: vec![0; width as usize * height as usize * 4],
            }),
            state: AtomicU8::new(TextureState::Pending.as_u8()),
        }
    }

    pub(crate) fn placeholder(key: &str) -> Self {
        let texture = Self::pending(key, PLACEHOLDER_SIZE, PLACEHOLDER_SIZE);
        texture.fill_placeholder();
        texture
    }

    pub(crate) fn fill(&self, width: u32, height: u32, rgba: Vec<u8>) {
        let mut pixels = self.pixels.write().unwrap_or_else(PoisonError::into_inner);
        *pixels = Pixels {
            width,
            height,
            rgba,
        };
        self.state
            .store(TextureState::Resident.as_u8(), Ordering::Release);
    }

    pub(crate) fn fill_placeholder(&self) {
        let mut pixels = self.pixels.write().unwrap_or_else(PoisonError::into_inner);
        *pixels = Pixels {
            width: PLACEHOLDER_SIZE,
            height: PLACEHOLDER_SIZE,
            rgba: placeholder_pixels(),
        };
        self.state
            .store(TextureState::Placeholder.as_u8(), Ordering::Release);
    }

    /// The asset key this texture was requested under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn state(&self) -> TextureState {
        TextureState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// True once pixels are final, real or placeholder.
    pub fn is_ready(&self) -> bool {
        self.state() != TextureState::Pending
    }

    pub fn size(&self) -> (u32, u32) {
        let pixels = self.pixels.read().unwrap_or_else(PoisonError::into_inner);
        (pixels.width, pixels.height)
    }

    /// Run `f` over the RGBA8 pixel data without copying it.
    pub fn with_pixels<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let pixels = self.pixels.read().unwrap_or_else(PoisonError::into_inner);
        f(&pixels.rgba)
    }

    /// Copy of the RGBA8 pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.with_pixels(<[u8]>::to_vec)
    }
}

/// The placeholder image: a magenta and black checkerboard, RGBA8.
pub fn placeholder_pixels() -> Vec<u8> {
    let mut rgba = Vec::with_capacity((PLACEHOLDER_SIZE * PLACEHOLDER_SIZE * 4) as usize);
    for y in 0..PLACEHOLDER_SIZE {
        for x in 0..PLACEHOLDER_SIZE {
            let even = (x / PLACEHOLDER_CELL + y / PLACEHOLDER_CELL) % 2 == 0;
            rgba.extend_from_slice(if even { &MAGENTA } else { &BLACK });
        }
    }
    rgba
}
