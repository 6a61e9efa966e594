use serde::Serialize;
use crate::model::{Modality, Uid};
use crate::tools::{Error, Result};

pub const MONOCHROME2:&str = "MONOCHROME2";

#[derive(Debug,Clone,PartialEq,Eq)]
pub struct Patient {
	/// person name in `LAST^FIRST` form
	pub name:String,
	pub id:String,
	/// `YYYYMMDD`
	pub birth_date:String,
	pub sex:String,
}

/// A study with its patient and series.
///
/// Only series can be appended after creation, everything else is fixed.
#[derive(Debug,Clone)]
pub struct Study {
	pub uid:Uid,
	/// `YYYYMMDD`
	pub date:String,
	/// `HHMMSS`
	pub time:String,
	pub accession_number:String,
	pub description:String,
	pub patient:Patient,
	series:Vec<Series>,
}

#[derive(Debug,Clone)]
pub struct Series {
	pub uid:Uid,
	/// 1-based
	pub number:u32,
	pub modality:Modality,
	pub description:String,
	pub body_part:String,
	images:Vec<Image>,
}

#[derive(Debug,Clone)]
pub struct Image {
	pub uid:Uid,
	/// 1-based
	pub instance_number:u32,
	pub sop_class_uid:&'static str,
	pub geometry:Option<Geometry>,
	pixels:Option<Vec<u8>>,
}

/// Declared layout of a single-frame grayscale raster.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize)]
pub struct Geometry {
	pub rows:u16,
	pub columns:u16,
	pub bits_allocated:u16,
	pub bits_stored:u16,
	pub high_bit:u16,
	pub samples_per_pixel:u16,
	pub photometric_interpretation:&'static str,
}

impl Geometry {
	pub fn monochrome(columns:u16,rows:u16,bits:u16) -> Result<Self>
	{
		if columns == 0 || rows == 0 {
			return Err(Error::InvalidParameter {name:"geometry".into(),message:format!("{columns}x{rows} has no pixels")});
		}
		if !(1..=16).contains(&bits) {
			return Err(Error::InvalidParameter {name:"bits".into(),message:format!("{bits} is outside 1..=16")});
		}
		Ok(Geometry{
			rows, columns,
			bits_allocated:bits.div_ceil(8)*8,
			bits_stored:bits,
			high_bit:bits-1,
			samples_per_pixel:1,
			photometric_interpretation:MONOCHROME2,
		})
	}
	pub fn bytes_per_sample(&self) -> usize
	{
		(self.bits_allocated/8) as usize
	}
	/// number of bytes the pixel data must have
	pub fn frame_len(&self) -> usize
	{
		self.rows as usize * self.columns as usize * self.samples_per_pixel as usize * self.bytes_per_sample()
	}
	pub fn max_value(&self) -> u32
	{
		(1u32 << self.bits_stored) - 1
	}
}

impl Study {
	pub(crate) fn new(uid:Uid,date:String,time:String,accession_number:String,description:String,patient:Patient) -> Self
	{
		Study{uid,date,time,accession_number,description,patient,series:vec![]}
	}
	pub fn series(&self) -> &[Series] {&self.series}
	pub fn push_series(&mut self,series:Series) {self.series.push(series)}
	/// total number of images across all series
	pub fn image_count(&self) -> usize
	{
		self.series.iter().map(|s|s.images.len()).sum()
	}
}

impl Series {
	pub(crate) fn new(uid:Uid,number:u32,modality:Modality,description:String,body_part:String) -> Self
	{
		Series{uid,number,modality,description,body_part,images:vec![]}
	}
	pub fn images(&self) -> &[Image] {&self.images}
	pub fn push_image(&mut self,image:Image) {self.images.push(image)}
}

impl Image {
	pub(crate) fn new(uid:Uid,instance_number:u32,sop_class_uid:&'static str,geometry:Option<Geometry>) -> Self
	{
		Image{uid,instance_number,sop_class_uid,geometry,pixels:None}
	}
	/// attaches the pixel buffer, it must match the declared geometry
	pub fn with_pixels(mut self,pixels:Vec<u8>) -> Result<Self>
	{
		let expected = self.geometry.map(|g|g.frame_len()).unwrap_or(0);
		if expected != pixels.len() {
			return Err(Error::GeometryMismatch {expected,found:pixels.len()});
		}
		self.pixels = Some(pixels);
		Ok(self)
	}
	pub fn pixels(&self) -> Option<&[u8]> {self.pixels.as_deref()}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn geometry_from_bits()
	{
		let g = Geometry::monochrome(640,480,8).unwrap();
		assert_eq!((g.bits_allocated,g.bits_stored,g.high_bit), (8,8,7));
		assert_eq!(g.frame_len(), 640*480);
		let g = Geometry::monochrome(3,5,12).unwrap();
		assert_eq!((g.bits_allocated,g.bits_stored,g.high_bit), (16,12,11));
		assert_eq!(g.frame_len(), 30);
		assert_eq!(g.max_value(), 4095);
		assert_eq!(Geometry::monochrome(1,1,16).unwrap().max_value(), 65535);
		assert!(Geometry::monochrome(0,5,8).is_err());
		assert!(Geometry::monochrome(5,5,17).is_err());
		assert!(Geometry::monochrome(5,5,0).is_err());
	}
}
