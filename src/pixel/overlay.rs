use crate::model::{Image, Series, Study};
use crate::pixel::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::pixel::Raster;

const ORIGIN:(usize,usize) = (20,30);
const LINE_GAP:usize = 3;
const PADDING:usize = 4;

/// Lines of text burned into the top left corner of a raster.
#[derive(Debug,Clone)]
pub struct TextBlock {
	lines:Vec<String>,
}

/// What [TextBlock::render] actually touched.
#[derive(Debug)]
pub struct RenderedBlock {
	/// left, top, right (exclusive), bottom (exclusive) of the backing rectangle
	pub rect:(usize,usize,usize,usize),
	pub glyph_pixels:Vec<(usize,usize)>,
	pub level:u32,
	pub lines_drawn:usize,
}

impl TextBlock {
	pub fn new(lines:Vec<String>) -> Self {TextBlock{lines}}

	pub fn for_image(study:&Study,series:&Series,image:&Image,total_instances:usize) -> Self
	{
		TextBlock::new(vec![
			format!("Patient: {}",study.patient.name),
			format!("Patient ID: {}",study.patient.id),
			format!("DOB: {}",study.patient.birth_date),
			format!("Accession: {}",study.accession_number),
			format!("Study UID: {}",study.uid),
			format!("Series UID: {}",series.uid),
			format!("Instance: {} of {}",image.instance_number,total_instances),
			format!("Modality: {}",series.modality),
			format!("Study Date: {}",study.date),
			format!("Generated by {}",env!("CARGO_PKG_NAME")),
		])
	}

	pub fn lines(&self) -> &[String] {&self.lines}

	/// integer glyph scale for a raster of the given width
	pub fn scale_for_width(width:usize) -> usize
	{
		match width {
			0..512 => 1,
			512..2048 => 2,
			_ => 3,
		}
	}

	/// Draws the block; returns `None` if not even one line fits.
	///
	/// All glyph pixels get the raster's maximum value, the rest of the
	/// padded block is cleared to zero.
	pub fn render(&self,raster:&mut Raster) -> Option<RenderedBlock>
	{
		let scale = Self::scale_for_width(raster.width());
		let (x0,y0) = ORIGIN;
		let padding = PADDING*scale;
		let line_height = (GLYPH_HEIGHT+LINE_GAP)*scale;
		let advance = (GLYPH_WIDTH+1)*scale;

		let room = raster.height().saturating_sub(y0+padding);
		let lines_drawn = (room/line_height).min(self.lines.len());
		if lines_drawn == 0 || raster.width() <= x0 {
			return None;
		}
		let lines = &self.lines[..lines_drawn];
		let widest = lines.iter().map(|l|l.chars().count()).max().unwrap_or(0);
		let rect = (
			x0-padding,
			y0-padding,
			(x0+widest*advance+padding).min(raster.width()),
			(y0+lines_drawn*line_height+padding).min(raster.height()),
		);
		let (left,top,right,bottom) = rect;
		let (mask_width,mask_height) = (right-left,bottom-top);
		let mut mask = vec![false;mask_width*mask_height];

		for (n,line) in lines.iter().enumerate() {
			let line_top = y0+n*line_height;
			for (i,c) in line.chars().enumerate() {
				let cell_left = x0+i*advance;
				if cell_left >= right {
					break;
				}
				let g = font::glyph(c);
				for row in 0..GLYPH_HEIGHT*scale {
					for col in 0..GLYPH_WIDTH*scale {
						let (x,y) = (cell_left+col,line_top+row);
						if x < right && y < bottom && font::is_set(&g,col/scale,row/scale) {
							mask[(y-top)*mask_width + x-left] = true;
						}
					}
				}
			}
		}

		let level = raster.max_value();
		let mut glyph_pixels = Vec::new();
		for y in top..bottom {
			for x in left..right {
				if mask[(y-top)*mask_width + x-left] {
					raster.put(x,y,level);
					glyph_pixels.push((x,y));
				} else {
					raster.put(x,y,0);
				}
			}
		}
		Some(RenderedBlock{rect,glyph_pixels,level,lines_drawn})
	}
}
