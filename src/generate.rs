use dicom::core::VR;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::dcm::max_len;
use crate::model::{Geometry, Image, MetadataBuilder, Modality, OrgRoot, Series, Study, UidGenerator};
use crate::pixel;
use crate::tools::{Error, Result};

pub const DEFAULT_ORG_ROOT:&str = "1.2.826.0.1.3680043.10.1071";

/// What to generate. Every field has a default so partial requests work.
#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct GenerationParams {
	pub study_count:usize,
	pub series_count:u32,
	pub image_count:u32,
	pub modality:String,
	pub anatomical_region:String,
	pub patient_name:Option<String>,
	pub patient_id:Option<String>,
	pub accession_number:Option<String>,
	pub study_description:Option<String>,
	pub width:Option<u16>,
	pub height:Option<u16>,
	pub bits:Option<u16>,
	pub org_root:String,
}

impl Default for GenerationParams {
	fn default() -> Self {
		GenerationParams{
			study_count:1,
			series_count:1,
			image_count:1,
			modality:"CR".into(),
			anatomical_region:"chest".into(),
			patient_name:None,
			patient_id:None,
			accession_number:None,
			study_description:None,
			width:None,
			height:None,
			bits:None,
			org_root:DEFAULT_ORG_ROOT.into(),
		}
	}
}

/// user supplied text must fit its attribute, measured in encoded bytes
fn fits(name:&str,value:Option<&str>,vr:VR) -> Result<()>
{
	match (value.map(str::trim),max_len(vr)) {
		(Some(value),Some(max)) if value.len() > max => Err(Error::InvalidParameter {
			name:name.into(),
			message:format!("'{value}' has {} bytes, at most {max} are allowed",value.len())
		}),
		_ => Ok(())
	}
}

impl GenerationParams {
	/// Rejects requests that cannot produce anything.
	///
	/// Unknown modality codes fail here, known codes without a storage class
	/// only fail per image.
	pub fn validate(&self) -> Result<Modality>
	{
		let positive = |name:&str,value:usize| if value == 0 {
			Err(Error::InvalidParameter {name:name.into(),message:"must be at least 1".into()})
		} else {Ok(())};
		positive("study_count",self.study_count)?;
		positive("series_count",self.series_count as usize)?;
		positive("image_count",self.image_count as usize)?;
		let region = self.anatomical_region.trim();
		if region.is_empty() {
			return Err(Error::InvalidParameter {name:"anatomical_region".into(),message:"must not be empty".into()});
		}
		// the region also becomes the body part, a code string
		if !region.is_ascii() {
			return Err(Error::InvalidParameter {name:"anatomical_region".into(),message:format!("'{region}' is not plain ASCII")});
		}
		fits("anatomical_region",Some(region),VR::CS)?;
		fits("patient_name",self.patient_name.as_deref(),VR::PN)?;
		fits("patient_id",self.patient_id.as_deref(),VR::LO)?;
		fits("accession_number",self.accession_number.as_deref(),VR::SH)?;
		fits("study_description",self.study_description.as_deref(),VR::LO)?;
		let modality = self.modality.parse()?;
		// overrides alone must already form a valid geometry
		Geometry::monochrome(self.width.unwrap_or(1),self.height.unwrap_or(1),self.bits.unwrap_or(8))?;
		OrgRoot::new(self.org_root.as_str())?;
		Ok(modality)
	}

	/// the modality default with the requested overrides applied
	pub fn geometry(&self,modality:Modality) -> Result<Option<Geometry>>
	{
		if self.width.is_none() && self.height.is_none() && self.bits.is_none() {
			return Ok(None);
		}
		let Some((width,height,bits)) = modality.info()?.geometry else {
			return Ok(None);
		};
		Geometry::monochrome(
			self.width.unwrap_or(width),
			self.height.unwrap_or(height),
			self.bits.unwrap_or(bits)
		).map(Some)
	}
}

/// An image that could not be generated.
#[derive(Debug)]
pub struct ItemFailure {
	/// 0-based position of the study in the request
	pub study_index:usize,
	pub series_number:u32,
	pub instance_number:u32,
	pub error:Error,
}

#[derive(Debug,Default)]
pub struct GenerationReport {
	pub studies:Vec<Study>,
	pub failures:Vec<ItemFailure>,
	/// problems that did not stop generation, e.g. degraded identifier randomness
	pub warnings:Vec<Error>,
}

impl GenerationReport {
	pub fn image_count(&self) -> usize
	{
		self.studies.iter().map(Study::image_count).sum()
	}
}

pub struct Generator {
	builder:MetadataBuilder,
}

impl Generator {
	pub fn new(builder:MetadataBuilder) -> Self
	{
		Generator{builder}
	}
	pub fn from_params(params:&GenerationParams) -> Result<Self>
	{
		let root = OrgRoot::new(params.org_root.as_str())?;
		Ok(Generator::new(MetadataBuilder::new(UidGenerator::new(root))))
	}
	pub fn builder(&self) -> &MetadataBuilder {&self.builder}

	/// Generates all requested studies, failed images are reported and skipped.
	pub fn generate<R:Rng+?Sized>(&self,params:&GenerationParams,rng:&mut R) -> Result<GenerationReport>
	{
		params.validate()?;
		let mut report = GenerationReport::default();
		for index in 0..params.study_count {
			let (study,failures) = self.generate_study(params,index,rng)?;
			report.studies.push(study);
			report.failures.extend(failures);
		}
		report.warnings = self.warnings();
		Ok(report)
	}

	/// Generates one study of the request.
	pub fn generate_study<R:Rng+?Sized>(&self,params:&GenerationParams,study_index:usize,rng:&mut R) -> Result<(Study,Vec<ItemFailure>)>
	{
		let modality:Modality = params.modality.parse()?;
		let geometry = match params.geometry(modality) {
			Err(Error::UnsupportedModality {..}) => None,
			other => other?,
		};
		let b = &self.builder;
		let patient = b.build_patient(params.patient_name.as_deref(),params.patient_id.as_deref(),rng);
		let mut study = b.build_study(params.study_description.as_deref(),params.accession_number.as_deref(),patient,rng);
		let mut failures = Vec::new();

		for series_number in 1..=params.series_count {
			let mut series = b.build_series(modality,series_number,params.anatomical_region.trim());
			for instance_number in 1..=params.image_count {
				match self.image(&study,&series,instance_number,geometry,params.image_count as usize,rng) {
					Ok(image) => series.push_image(image),
					Err(error) => {
						warn!("skipping image {instance_number} of series {series_number} in study {}: {error}",study.uid);
						failures.push(ItemFailure{study_index,series_number,instance_number,error});
					}
				}
			}
			study.push_series(series);
		}
		info!("generated study {} ({} images, {} failed)",study.uid,study.image_count(),failures.len());
		Ok((study,failures))
	}

	fn image<R:Rng+?Sized>(&self,study:&Study,series:&Series,instance_number:u32,geometry:Option<Geometry>,total:usize,rng:&mut R) -> Result<Image>
	{
		let image = self.builder.build_image(series,instance_number,geometry)?;
		match pixel::render_image(study,series,&image,total,rng) {
			Some(pixels) => image.with_pixels(pixels),
			None => Ok(image),
		}
	}

	pub fn warnings(&self) -> Vec<Error>
	{
		self.builder.uids().degradation().into_iter().collect()
	}
}
