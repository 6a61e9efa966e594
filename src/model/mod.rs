mod uid;
mod records;
mod builder;

use std::fmt::{Display, Formatter};
use std::str::FromStr;
use dicom::dictionary_std::uids;
use serde::Serialize;
use crate::tools::{Error, Result};

pub use uid::{OrgRoot, Uid, UidGenerator, EntropySource, OsEntropy, UID_MAX_LEN};
pub use records::{Patient, Study, Series, Image, Geometry, MONOCHROME2};
pub use builder::MetadataBuilder;

/// Acquisition modalities known to the generator.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,PartialOrd,Ord,Serialize)]
pub enum Modality {
	CR, CT, MR, US, DX, MG, NM, PT, RT, SR, OT
}

/// Procedural pixel content used for a modality.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum Pattern {
	Radiography,
	CrossSection,
	Bands,
	Ultrasound,
	Mammography,
	NuclearHotSpots,
	PetHotSpots,
	TreatmentField,
	Noise,
}

/// One row of the modality table.
#[derive(Debug)]
pub struct ModalityInfo {
	pub modality:Modality,
	pub sop_class_uid:&'static str,
	pub sop_class_name:&'static str,
	/// default columns, rows and bits per pixel, `None` if the object carries no pixel data
	pub geometry:Option<(u16,u16,u16)>,
	pub pattern:Option<Pattern>,
}

const MODALITY_TABLE:&[ModalityInfo] = &[
	ModalityInfo{modality:Modality::CR, sop_class_uid:uids::COMPUTED_RADIOGRAPHY_IMAGE_STORAGE, sop_class_name:"Computed Radiography Image Storage", geometry:Some((2048,2048,16)), pattern:Some(Pattern::Radiography)},
	ModalityInfo{modality:Modality::CT, sop_class_uid:uids::CT_IMAGE_STORAGE, sop_class_name:"CT Image Storage", geometry:Some((512,512,16)), pattern:Some(Pattern::CrossSection)},
	ModalityInfo{modality:Modality::MR, sop_class_uid:uids::MR_IMAGE_STORAGE, sop_class_name:"MR Image Storage", geometry:Some((256,256,16)), pattern:Some(Pattern::Bands)},
	ModalityInfo{modality:Modality::US, sop_class_uid:uids::ULTRASOUND_IMAGE_STORAGE, sop_class_name:"Ultrasound Image Storage", geometry:Some((640,480,8)), pattern:Some(Pattern::Ultrasound)},
	ModalityInfo{modality:Modality::DX, sop_class_uid:uids::DIGITAL_X_RAY_IMAGE_STORAGE_FOR_PRESENTATION, sop_class_name:"Digital X-Ray Image Storage - For Presentation", geometry:Some((2048,2048,16)), pattern:Some(Pattern::Radiography)},
	ModalityInfo{modality:Modality::MG, sop_class_uid:uids::DIGITAL_MAMMOGRAPHY_X_RAY_IMAGE_STORAGE_FOR_PRESENTATION, sop_class_name:"Digital Mammography X-Ray Image Storage - For Presentation", geometry:Some((4096,3328,16)), pattern:Some(Pattern::Mammography)},
	ModalityInfo{modality:Modality::NM, sop_class_uid:uids::NUCLEAR_MEDICINE_IMAGE_STORAGE, sop_class_name:"Nuclear Medicine Image Storage", geometry:Some((256,256,16)), pattern:Some(Pattern::NuclearHotSpots)},
	ModalityInfo{modality:Modality::PT, sop_class_uid:uids::POSITRON_EMISSION_TOMOGRAPHY_IMAGE_STORAGE, sop_class_name:"Positron Emission Tomography Image Storage", geometry:Some((256,256,16)), pattern:Some(Pattern::PetHotSpots)},
	ModalityInfo{modality:Modality::RT, sop_class_uid:uids::RT_IMAGE_STORAGE, sop_class_name:"RT Image Storage", geometry:Some((512,512,16)), pattern:Some(Pattern::TreatmentField)},
	ModalityInfo{modality:Modality::SR, sop_class_uid:uids::BASIC_TEXT_SR_STORAGE, sop_class_name:"Basic Text SR Storage", geometry:None, pattern:None},
];

impl Modality {
	pub const ALL:[Modality;11] = [
		Modality::CR, Modality::CT, Modality::MR, Modality::US, Modality::DX, Modality::MG,
		Modality::NM, Modality::PT, Modality::RT, Modality::SR, Modality::OT
	];

	pub fn code(&self) -> &'static str
	{
		match self {
			Modality::CR => "CR",
			Modality::CT => "CT",
			Modality::MR => "MR",
			Modality::US => "US",
			Modality::DX => "DX",
			Modality::MG => "MG",
			Modality::NM => "NM",
			Modality::PT => "PT",
			Modality::RT => "RT",
			Modality::SR => "SR",
			Modality::OT => "OT",
		}
	}

	/// looks up the table entry, fails for modalities that have no storage class
	pub fn info(&self) -> Result<&'static ModalityInfo>
	{
		MODALITY_TABLE.iter()
			.find(|i|i.modality == *self)
			.ok_or(Error::UnsupportedModality {modality:self.code().into()})
	}

	/// the synthesis pattern, generic noise for modalities without a dedicated one
	pub fn pattern(&self) -> Pattern
	{
		match self.info() {
			Ok(ModalityInfo{pattern:Some(p),..}) => *p,
			_ => Pattern::Noise,
		}
	}

	pub fn has_pixel_data(&self) -> bool
	{
		*self != Modality::SR
	}
}

impl FromStr for Modality {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		let code = s.trim().to_ascii_uppercase();
		Modality::ALL.into_iter()
			.find(|m|m.code() == code)
			.ok_or(Error::UnsupportedModality {modality:s.into()})
	}
}

impl Display for Modality {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.code())
	}
}
