//! Procedural pixel synthesis.
//!
//! All randomness comes from the caller's rng, so a seeded generator gives
//! reproducible rasters.
mod font;
mod patterns;
mod overlay;

use rand::Rng;
use crate::model::{Geometry, Image, Modality, Series, Study};

pub use font::{glyph, GLYPH_WIDTH, GLYPH_HEIGHT};
pub use overlay::{TextBlock, RenderedBlock};

/// A single-channel raster with little-endian samples.
#[derive(Debug,Clone)]
pub struct Raster {
	width:usize,
	height:usize,
	bytes_per_sample:usize,
	max_value:u32,
	data:Vec<u8>,
}

impl Raster {
	/// `bits` is clamped to 1..=16
	pub fn new(width:usize,height:usize,bits:u16) -> Self
	{
		let bits = bits.clamp(1,16) as u32;
		let bytes_per_sample = bits.div_ceil(8) as usize;
		Raster{
			width,height,bytes_per_sample,
			max_value:(1u32<<bits)-1,
			data:vec![0;width*height*bytes_per_sample]
		}
	}
	pub fn for_geometry(geometry:&Geometry) -> Self
	{
		Raster::new(geometry.columns as usize,geometry.rows as usize,geometry.bits_stored)
	}
	pub fn width(&self) -> usize {self.width}
	pub fn height(&self) -> usize {self.height}
	pub fn max_value(&self) -> u32 {self.max_value}

	/// stores `value` clamped to the raster's range, coordinates outside are ignored
	pub fn put(&mut self,x:usize,y:usize,value:u32)
	{
		if x >= self.width || y >= self.height {
			return;
		}
		let pos = (y*self.width + x)*self.bytes_per_sample;
		let bytes = value.min(self.max_value).to_le_bytes();
		self.data[pos..pos+self.bytes_per_sample].copy_from_slice(&bytes[..self.bytes_per_sample]);
	}
	/// stores a fraction of the full range, clamped to 0..=1
	pub fn put_level(&mut self,x:usize,y:usize,level:f64)
	{
		let value = (level.clamp(0.0,1.0) * self.max_value as f64).round() as u32;
		self.put(x,y,value)
	}
	pub fn get(&self,x:usize,y:usize) -> u32
	{
		let pos = (y*self.width + x)*self.bytes_per_sample;
		let mut bytes = [0u8;4];
		bytes[..self.bytes_per_sample].copy_from_slice(&self.data[pos..pos+self.bytes_per_sample]);
		u32::from_le_bytes(bytes)
	}
	pub fn as_bytes(&self) -> &[u8] {&self.data}
	pub fn into_bytes(self) -> Vec<u8> {self.data}
}

/// Fills a raster with the modality's pattern (without the metadata overlay).
///
/// Returns `width * height * ceil(bits/8)` bytes; SR yields an empty buffer.
pub fn synthesize<R:Rng+?Sized>(modality:Modality,width:usize,height:usize,bits:u16,rng:&mut R) -> Vec<u8>
{
	if !modality.has_pixel_data() {
		return vec![];
	}
	let mut raster = Raster::new(width,height,bits);
	patterns::paint(&mut raster,modality,rng);
	raster.into_bytes()
}

/// Synthesizes the complete pixel data for an image, burning in the metadata text.
///
/// Returns `None` if the image has no raster.
pub fn render_image<R:Rng+?Sized>(study:&Study,series:&Series,image:&Image,total_instances:usize,rng:&mut R) -> Option<Vec<u8>>
{
	let geometry = image.geometry.as_ref()?;
	let mut raster = Raster::for_geometry(geometry);
	patterns::paint(&mut raster,series.modality,rng);
	let block = TextBlock::for_image(study,series,image,total_instances);
	if block.render(&mut raster).is_none() {
		tracing::debug!("image {} is too small for the text overlay",image.uid);
	}
	Some(raster.into_bytes())
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;
	use super::*;

	#[test]
	fn raster_samples()
	{
		let mut r = Raster::new(4,3,12);
		r.put(1,2,70000);
		assert_eq!(r.get(1,2), 4095);
		r.put(0,0,0x0102);
		assert_eq!(&r.as_bytes()[..2], &[0x02,0x01]);
		r.put(9,9,1);// ignored
		r.put_level(3,0,0.5);
		assert_eq!(r.get(3,0), 2048);

		let mut r = Raster::new(2,2,8);
		r.put(1,1,300);
		assert_eq!(r.into_bytes(), vec![0,0,0,255]);
	}

	#[test]
	fn buffer_length_per_modality()
	{
		let mut rng = StdRng::seed_from_u64(7);
		for modality in Modality::ALL {
			for (w,h,bits) in [(64,48,8),(33,17,12),(100,64,16)] {
				let buffer = synthesize(modality,w,h,bits,&mut rng);
				let expected = if modality == Modality::SR {0} else {w*h*(bits as usize).div_ceil(8)};
				assert_eq!(buffer.len(), expected, "{modality} {w}x{h}x{bits}");
			}
		}
	}

	#[test]
	fn values_stay_in_range()
	{
		let mut rng = StdRng::seed_from_u64(11);
		for modality in Modality::ALL.into_iter().filter(Modality::has_pixel_data) {
			let buffer = synthesize(modality,50,40,12,&mut rng);
			let max = buffer.chunks_exact(2).map(|c|u16::from_le_bytes([c[0],c[1]])).max().unwrap();
			assert!(max <= 4095, "{modality} produced {max}");
		}
	}

	#[test]
	fn seeded_rng_is_reproducible()
	{
		let a = synthesize(Modality::MR,64,64,16,&mut StdRng::seed_from_u64(3));
		let b = synthesize(Modality::MR,64,64,16,&mut StdRng::seed_from_u64(3));
		assert_eq!(a,b);
	}
}
