use std::f64::consts::PI;
use rand::Rng;
use crate::model::{Modality, Pattern};
use crate::pixel::font::{self, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::pixel::Raster;

/// gaussian hot spots as (x, y, radius) in fractions of the raster size and peak level
type Spot = (f64,f64,f64,f64);

const NM_SPOTS:[Spot;3] = [(0.25,0.25,0.125,0.8),(0.75,0.5,0.16,0.6),(0.5,0.75,0.1,0.4)];
const PT_SPOTS:[Spot;3] = [(0.3,0.3,0.15,0.9),(0.7,0.6,0.12,0.7),(0.5,0.8,0.08,0.5)];

pub(super) fn paint<R:Rng+?Sized>(raster:&mut Raster,modality:Modality,rng:&mut R)
{
	match modality.pattern() {
		Pattern::Radiography => radiography(raster,modality.code()),
		Pattern::CrossSection => cross_section(raster,rng),
		Pattern::Bands => diagonal_bands(raster,rng),
		Pattern::Ultrasound => ultrasound(raster,rng),
		Pattern::Mammography => mammography(raster,rng),
		Pattern::NuclearHotSpots => hot_spots(raster,&NM_SPOTS,rng),
		Pattern::PetHotSpots => hot_spots(raster,&PT_SPOTS,rng),
		Pattern::TreatmentField => treatment_field(raster,rng),
		Pattern::Noise => noise(raster,rng),
	}
}

fn radiography(raster:&mut Raster,code:&str)
{
	let (cx,cy) = (raster.width() as f64/2.0,raster.height() as f64/2.0);
	for y in 0..raster.height() {
		for x in 0..raster.width() {
			let (dx,dy) = (x as f64-cx,y as f64-cy);
			let r = dx.hypot(dy);
			let theta = dy.atan2(dx);
			let level = ((theta+PI)/(2.0*PI)*10.0 + r/50.0).fract();
			raster.put_level(x,y,level);
		}
	}
	// modality code large and centered
	let scale = (raster.width().min(raster.height())/64).max(1);
	let advance = (GLYPH_WIDTH+1)*scale;
	let text_width = advance*code.len() - scale;
	let text_height = GLYPH_HEIGHT*scale;
	let left = raster.width().saturating_sub(text_width)/2;
	let top = raster.height().saturating_sub(text_height)/2;
	let max = raster.max_value();
	for (i,c) in code.chars().enumerate() {
		let g = font::glyph(c);
		for row in 0..GLYPH_HEIGHT*scale {
			for col in 0..GLYPH_WIDTH*scale {
				if font::is_set(&g,col/scale,row/scale) {
					raster.put(left+i*advance+col,top+row,max);
				}
			}
		}
	}
}

fn cross_section<R:Rng+?Sized>(raster:&mut Raster,rng:&mut R)
{
	let (cx,cy) = (raster.width() as f64/2.0,raster.height() as f64/2.0);
	let radius = raster.width().min(raster.height()) as f64/2.0;
	for y in 0..raster.height() {
		for x in 0..raster.width() {
			let inside = (x as f64-cx).hypot(y as f64-cy) < radius;
			let level = if inside {
				0.72 + rng.random_range(0.0..0.06)
			} else {
				0.02 + rng.random_range(0.0..0.02)
			};
			raster.put_level(x,y,level);
		}
	}
}

fn diagonal_bands<R:Rng+?Sized>(raster:&mut Raster,rng:&mut R)
{
	const OFFSETS:[f64;4] = [0.08,-0.08,0.16,-0.16];
	for y in 0..raster.height() {
		for x in 0..raster.width() {
			let band = (x/64 + y/64) % 4;
			raster.put_level(x,y,rng.random_range(0.2..0.8) + OFFSETS[band]);
		}
	}
}

fn ultrasound<R:Rng+?Sized>(raster:&mut Raster,rng:&mut R)
{
	let h = raster.height();
	for y in 0..h {
		let depth = if y < h/8 {0.12} else if y < h/4 {0.31} else if y < h/2 {0.47} else {0.25};
		for x in 0..raster.width() {
			let speckle = 1.0 + rng.random_range(-0.3..0.3);
			let mut level = depth*speckle;
			if y % 4 == 0 {
				level += 0.05 + rng.random_range(0.0..0.03);
			}
			raster.put_level(x,y,level);
		}
	}
}

fn mammography<R:Rng+?Sized>(raster:&mut Raster,rng:&mut R)
{
	for y in 0..raster.height() {
		for x in 0..raster.width() {
			let mut level = rng.random_range(0.39..0.61);
			if (x+y) % 100 < 5 {
				level += 0.04;
			}
			if (x as i64 - y as i64).rem_euclid(150) < 8 {
				level -= 0.04;
			}
			raster.put_level(x,y,level);
		}
	}
}

fn hot_spots<R:Rng+?Sized>(raster:&mut Raster,spots:&[Spot],rng:&mut R)
{
	let (w,h) = (raster.width() as f64,raster.height() as f64);
	let scale = w.min(h);
	for y in 0..raster.height() {
		for x in 0..raster.width() {
			let mut level = rng.random_range(0.01..0.06);
			for &(sx,sy,sr,peak) in spots {
				let d2 = (x as f64-sx*w).powi(2) + (y as f64-sy*h).powi(2);
				let r = (sr*scale).max(1.0);
				level += peak*(-d2/(2.0*r*r)).exp();
			}
			raster.put_level(x,y,level);
		}
	}
}

fn treatment_field<R:Rng+?Sized>(raster:&mut Raster,rng:&mut R)
{
	let (w,h) = (raster.width(),raster.height());
	let (left,right,top,bottom) = (w/4,3*w/4,h/4,3*h/4);
	let band = (w.min(h)/25).max(2) as f64;
	for y in 0..h {
		for x in 0..w {
			let inside = (left..right).contains(&x) && (top..bottom).contains(&y);
			let mut level = if inside {
				0.6 + rng.random_range(0.0..0.08)
			} else {
				0.02 + rng.random_range(0.0..0.03)
			};
			// distance to the field edge, graded on both sides
			let dx = (x as f64 - left as f64).abs().min((x as f64 - right as f64).abs());
			let dy = (y as f64 - top as f64).abs().min((y as f64 - bottom as f64).abs());
			let near_x = dx < band && (top..bottom).contains(&y);
			let near_y = dy < band && (left..right).contains(&x);
			if near_x || near_y {
				level += 0.25*(1.0 - dx.min(dy)/band);
			}
			raster.put_level(x,y,level);
		}
	}
}

fn noise<R:Rng+?Sized>(raster:&mut Raster,rng:&mut R)
{
	let max = raster.max_value();
	for y in 0..raster.height() {
		for x in 0..raster.width() {
			raster.put(x,y,rng.random_range(0..=max));
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;
	use super::*;

	fn painted(modality:Modality,w:usize,h:usize,bits:u16) -> Raster
	{
		let mut raster = Raster::new(w,h,bits);
		paint(&mut raster,modality,&mut StdRng::seed_from_u64(5));
		raster
	}

	#[test]
	fn ct_disc_is_brighter_than_background()
	{
		let r = painted(Modality::CT,64,64,16);
		assert!(r.get(32,32) > 45000);
		assert!(r.get(0,0) < 3000);
	}

	#[test]
	fn radiography_draws_code_at_max()
	{
		let r = painted(Modality::CR,128,128,16);
		// centre column of the 'C' stroke on its top row
		let scale = 2;
		let text_width = (GLYPH_WIDTH+1)*scale*2 - scale;
		let left = (128-text_width)/2;
		let top = (128-GLYPH_HEIGHT*scale)/2;
		assert_eq!(r.get(left+2*scale,top), 65535);
	}

	#[test]
	fn ultrasound_depth_bands()
	{
		let r = painted(Modality::US,64,64,8);
		let row_mean = |y:usize| (0..64).map(|x|r.get(x,y) as f64).sum::<f64>()/64.0;
		assert!(row_mean(3) < row_mean(13));
		assert!(row_mean(13) < row_mean(25));
		assert!(row_mean(41) < row_mean(25));
	}

	#[test]
	fn hot_spot_peaks()
	{
		let r = painted(Modality::NM,64,64,16);
		assert!(r.get(16,16) > r.get(63,0));
		let r = painted(Modality::PT,100,100,16);
		assert!(r.get(30,30) > r.get(99,0));
	}

	#[test]
	fn treatment_field_inside_outside()
	{
		let r = painted(Modality::RT,100,100,16);
		assert!(r.get(50,50) > 35000);
		assert!(r.get(5,5) < 5000);
	}
}
