use chrono::{Local, NaiveDateTime};
use rand::Rng;
use rand::seq::IndexedRandom;
use crate::model::{Geometry, Image, Modality, Patient, Series, Study, UidGenerator};
use crate::tools::Result;

const LAST_NAMES:&[&str] = &["DOE","SMITH","JONES","BROWN","TAYLOR","WILSON","NGUYEN","GARCIA","MUELLER","KOWALSKI"];
const FIRST_NAMES:&[&str] = &["JANE","JOHN","ALEX","SAM","MARIA","CHRIS","ROBIN","KIM","NOAH","EMMA"];

const DEFAULT_BIRTH_DATE:&str = "19500101";
const DEFAULT_SEX:&str = "O";
const DEFAULT_STUDY_DESCRIPTION:&str = "Synthetic Study";

fn given(value:Option<&str>) -> Option<&str>
{
	value.map(str::trim).filter(|v|!v.is_empty())
}

/// Builds patient, study, series and image records with fresh identifiers.
pub struct MetadataBuilder {
	uids:UidGenerator,
	now:NaiveDateTime,
}

impl MetadataBuilder {
	pub fn new(uids:UidGenerator) -> Self
	{
		MetadataBuilder{uids,now:Local::now().naive_local()}
	}
	/// fixes the timestamp used for study dates and accession numbers
	pub fn at(mut self,now:NaiveDateTime) -> Self
	{
		self.now = now;
		self
	}
	pub fn uids(&self) -> &UidGenerator {&self.uids}
	pub fn now(&self) -> NaiveDateTime {self.now}

	pub fn build_patient<R:Rng+?Sized>(&self,name:Option<&str>,id:Option<&str>,rng:&mut R) -> Patient
	{
		let name = match given(name) {
			Some(name) => name.to_string(),
			None => {
				let last = LAST_NAMES.choose(rng).unwrap_or(&"DOE");
				let first = FIRST_NAMES.choose(rng).unwrap_or(&"JANE");
				format!("{last}^{first}")
			}
		};
		let id = match given(id) {
			Some(id) => id.to_string(),
			None => format!("PID{:08}",rng.random_range(0..100_000_000u32)),
		};
		Patient{name,id,birth_date:DEFAULT_BIRTH_DATE.into(),sex:DEFAULT_SEX.into()}
	}

	pub fn build_study<R:Rng+?Sized>(&self,description:Option<&str>,accession:Option<&str>,patient:Patient,rng:&mut R) -> Study
	{
		let date = self.now.format("%Y%m%d").to_string();
		let time = self.now.format("%H%M%S").to_string();
		let accession = match given(accession) {
			Some(accession) => accession.to_string(),
			None => format!("{date}-{:04}",rng.random_range(0..10_000u32)),
		};
		let description = given(description).unwrap_or(DEFAULT_STUDY_DESCRIPTION).to_string();
		Study::new(self.uids.generate_identifier(),date,time,accession,description,patient)
	}

	pub fn build_series(&self,modality:Modality,index:u32,region:&str) -> Series
	{
		let description = format!("{modality} {region}");
		Series::new(self.uids.generate_identifier(),index,modality,description,region.to_string())
	}

	/// Creates the image record.
	///
	/// `geometry` replaces the modality's default raster layout; it is ignored for
	/// objects without pixel data.
	pub fn build_image(&self,series:&Series,instance_index:u32,geometry:Option<Geometry>) -> Result<Image>
	{
		let info = series.modality.info()?;
		let geometry = match info.geometry {
			None => None,
			Some(_) if geometry.is_some() => geometry,
			Some((columns,rows,bits)) => Some(Geometry::monochrome(columns,rows,bits)?),
		};
		Ok(Image::new(self.uids.generate_identifier(),instance_index,info.sop_class_uid,geometry))
	}
}
