#![allow(dead_code)]
use chrono::{NaiveDate, NaiveDateTime};
use dicom::object::DefaultDicomObject;
use dicomsynth::{GenerationParams, Generator};
use dicomsynth::model::{MetadataBuilder, UidGenerator};

pub const ORG_ROOT:&str = "1.2.826.0.1.3680043.10.1071";

pub fn fixed_time() -> NaiveDateTime
{
	NaiveDate::from_ymd_opt(2024,5,17).unwrap().and_hms_opt(8,15,30).unwrap()
}

pub fn generator() -> Generator
{
	let uids = UidGenerator::new(ORG_ROOT.parse().unwrap());
	Generator::new(MetadataBuilder::new(uids).at(fixed_time()))
}

/// small images so tests stay fast
pub fn params(modality:&str,series:u32,images:u32) -> GenerationParams
{
	GenerationParams{
		modality:modality.into(),
		series_count:series,
		image_count:images,
		width:Some(64),
		height:Some(48),
		..Default::default()
	}
}

/// parses with the dicom crate, independent of our own decoder
pub fn parse_with_dicom(bytes:&[u8]) -> Result<DefaultDicomObject, Box<dyn std::error::Error>>
{
	Ok(dicom::object::from_reader(&bytes[128..])?)
}

pub fn text(obj:&DefaultDicomObject,tag:dicom::core::Tag) -> Result<String, Box<dyn std::error::Error>>
{
	Ok(obj.element(tag)?.to_str()?.trim_end_matches(['\0',' ']).to_string())
}
