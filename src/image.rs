use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::prelude::*;

/// RGB byte image (3 channels, 8 bit), the format the id pass renders
/// to and the debug rasterizer draws into.
#[derive(Clone)]
pub struct ImageData {
    pixels: Vec<u8>, // [R1, G1, B1, R2, G2, B2, ...]
    width: u32,
    height: u32,
    name: String,
}

impl ImageData {
    pub fn new(width: u32, height: u32, name: String, pixels: Vec<u8>) -> Self {
        if pixels.len() != (width * height) as usize * 3 {
            warn!(
                "Image buffer has {} bytes, expected {} for {}x{}x3",
                pixels.len(),
                (width * height) as usize * 3,
                width,
                height
            );
        }
        ImageData {
            pixels,
            width,
            height,
            name,
        }
    }

    /// Create a new image filled with the given background color.
    pub fn new_from_background(width: u32, height: u32, name: String, background: [u8; 3]) -> Self {
        let pixels = background.repeat((width * height) as usize);
        Self::new(width, height, name, pixels)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn check_extension(&self, path: &Path, extension: &str) -> bool {
        path.extension().and_then(|ext| ext.to_str()) == Some(extension)
    }

    pub fn get_png_fullpath(&self, path: &str) -> PathBuf {
        // Check if provided path is a folder
        // if so, create a .png under this folder
        // otherwise use the provided path as is
        let extension = "png";
        let path = Path::new(path);
        let mut finalpath: PathBuf = path.to_path_buf();
        if path.is_dir() {
            // create <imagename>.png under this directory
            finalpath = path.join(self.name.clone());
        }

        if !self.check_extension(&finalpath, extension) {
            finalpath.set_extension(extension);
            warn!(
                ">> Extension changed to .{}, final path is {}",
                extension,
                finalpath.to_str().unwrap_or("<invalid UTF-8 path>")
            );
        }
        finalpath
    }

    /// Write the image to a .png file. Path is either a folder name or
    /// a full path including <imagename>.png; without a full path the
    /// stored image name is used.
    ///
    /// DISCLAIMER: This function is based on https://docs.rs/png/0.18.0/png/
    pub fn save_png(self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let path: PathBuf = self.get_png_fullpath(path);

        let file = File::create(&path)?;
        let w = &mut BufWriter::new(file);
        let mut encoder = png::Encoder::new(w, self.width, self.height);

        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;

        writer.write_image_data(&self.pixels)?; // Save
        info!("Image saved to {}", path.to_str().unwrap_or("<invalid UTF-8 path>"));
        Ok(())
    }
}
