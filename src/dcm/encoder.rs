use std::fmt::{Display, Formatter};
use std::sync::Arc;
use dicom::core::{Tag, VR};
use dicom::core::dictionary::{DataDictionary, DataDictionaryEntry};
use dicom::dictionary_std::{tags, StandardDataDictionary};
use serde::Serialize;
use tracing::{debug, error};
use crate::dcm::{decode, max_len, violation, DataSet, Element, Value, EXPLICIT_VR_LITTLE_ENDIAN, LATIN1, MAGIC, PREAMBLE_LEN, UTF8};
use crate::model::{Image, Modality, Patient, Series, Study, Uid};
use crate::tools::{Context, Error, Result};

const META_VERSION:[u8;2] = [0x00,0x01];
const MANUFACTURER:&str = "dicomsynth";

/// Values that go into every object's meta information.
#[derive(Debug,Clone)]
pub struct EncoderSettings {
	pub implementation_class_uid:String,
	pub implementation_version_name:String,
	pub source_ae_title:Option<String>,
}

impl Default for EncoderSettings {
	fn default() -> Self {
		EncoderSettings{
			implementation_class_uid:"1.2.826.0.1.3680043.10.1071.1".into(),
			implementation_version_name:"DICOMSYNTH_01".into(),
			source_ae_title:Some("DICOMSYNTH".into()),
		}
	}
}

/// Where an encoded object belongs, independent of any storage.
#[derive(Debug,Clone,PartialEq,Eq,Serialize)]
pub struct PathHint {
	pub study_uid:Uid,
	pub series_number:u32,
	pub instance_number:u32,
	pub sop_instance_uid:Uid,
	pub modality:Modality,
}

impl PathHint {
	pub fn new(study:&Study,series:&Series,image:&Image) -> Self
	{
		PathHint{
			study_uid:study.uid.clone(),
			series_number:series.number,
			instance_number:image.instance_number,
			sop_instance_uid:image.uid.clone(),
			modality:series.modality,
		}
	}
}

impl Display for PathHint {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f,"{}/series_{:03}/image_{:03}.dcm",self.study_uid,self.series_number,self.instance_number)
	}
}

#[derive(Debug)]
pub struct EncodedObject {
	pub hint:PathHint,
	pub bytes:Vec<u8>,
}

/// Result of encoding a whole study, failures do not stop the other images.
#[derive(Debug,Default)]
pub struct StudyEncoding {
	pub encoded:Vec<EncodedObject>,
	pub failed:Vec<(PathHint,Error)>,
}

#[derive(Debug,Clone,Default)]
pub struct Encoder {
	settings:Arc<EncoderSettings>,
}

/// adds text that must fit its VR, nothing is ever cut short
fn text(ds:&mut DataSet,tag:Tag,vr:VR,value:&str) -> Result<()>
{
	if let Some(max) = max_len(vr) {
		if value.len() > max {
			let name = StandardDataDictionary.by_tag(tag).map(|e|e.alias().to_string()).unwrap_or_else(||tag.to_string());
			return Err(Error::InvalidParameter {name,message:format!(
				"{} bytes exceed the {max} bytes allowed for {}",value.len(),vr.to_string()
			)});
		}
	}
	ds.put_str(tag,vr,value)
}

impl Encoder {
	pub fn new(settings:EncoderSettings) -> Self
	{
		Encoder{settings:Arc::new(settings)}
	}
	pub fn settings(&self) -> &EncoderSettings {&self.settings}

	/// Encodes one image into a complete Part 10 byte stream.
	pub fn encode_object(&self,patient:&Patient,study:&Study,series:&Series,image:&Image,pixels:Option<&[u8]>) -> Result<Vec<u8>>
	{
		series.modality.info()?;
		let expected = image.geometry.map(|g|g.frame_len()).unwrap_or(0);
		let found = pixels.map(<[u8]>::len).unwrap_or(0);
		if expected != found {
			return Err(Error::GeometryMismatch {expected,found});
		}

		let meta = self.meta_information(image)?;
		let dataset = self.data_set(patient,study,series,image,pixels)?;

		let mut out = Vec::with_capacity(PREAMBLE_LEN + 1024 + found);
		out.resize(PREAMBLE_LEN,0);
		out.extend_from_slice(MAGIC);
		write_meta(&meta,&mut out)?;
		dataset.write_to(&mut out)?;

		decode(&out)
			.and_then(|decoded|decoded.check_invariants())
			.map_err(|e|violation(format!("encoded {} fails its own checks: {e}",image.uid)))?;
		Ok(out)
	}

	/// Encodes every image of the study in series and instance order.
	pub fn encode_study(&self,study:&Study) -> StudyEncoding
	{
		let mut result = StudyEncoding::default();
		for series in study.series() {
			for image in series.images() {
				let hint = PathHint::new(study,series,image);
				match self.encode_object(&study.patient,study,series,image,image.pixels())
					.context(format!("encoding {hint}"))
				{
					Ok(bytes) => {
						debug!("encoded {hint} ({} bytes)",bytes.len());
						result.encoded.push(EncodedObject{hint,bytes});
					}
					Err(e) => {
						error!("{e}");
						result.failed.push((hint,e));
					}
				}
			}
		}
		result
	}

	fn meta_information(&self,image:&Image) -> Result<DataSet>
	{
		let mut meta = DataSet::new();
		meta.insert(Element::new(tags::FILE_META_INFORMATION_VERSION,VR::OB,Value::Bytes(META_VERSION.to_vec())))?;
		meta.put_str(tags::MEDIA_STORAGE_SOP_CLASS_UID,VR::UI,image.sop_class_uid)?;
		meta.put_str(tags::MEDIA_STORAGE_SOP_INSTANCE_UID,VR::UI,image.uid.as_str())?;
		meta.put_str(tags::TRANSFER_SYNTAX_UID,VR::UI,EXPLICIT_VR_LITTLE_ENDIAN)?;
		text(&mut meta,tags::IMPLEMENTATION_CLASS_UID,VR::UI,&self.settings.implementation_class_uid)?;
		text(&mut meta,tags::IMPLEMENTATION_VERSION_NAME,VR::SH,&self.settings.implementation_version_name)?;
		if let Some(ae) = &self.settings.source_ae_title {
			text(&mut meta,tags::SOURCE_APPLICATION_ENTITY_TITLE,VR::AE,ae)?;
		}
		Ok(meta)
	}

	fn data_set(&self,patient:&Patient,study:&Study,series:&Series,image:&Image,pixels:Option<&[u8]>) -> Result<DataSet>
	{
		let mut ds = DataSet::new();
		ds.put_str(tags::INSTANCE_CREATION_DATE,VR::DA,study.date.as_str())?;
		ds.put_str(tags::INSTANCE_CREATION_TIME,VR::TM,study.time.as_str())?;
		ds.put_str(tags::SOP_CLASS_UID,VR::UI,image.sop_class_uid)?;
		ds.put_str(tags::SOP_INSTANCE_UID,VR::UI,image.uid.as_str())?;
		for (date,time) in [
			(tags::STUDY_DATE,tags::STUDY_TIME),
			(tags::SERIES_DATE,tags::SERIES_TIME),
			(tags::CONTENT_DATE,tags::CONTENT_TIME)
		] {
			ds.put_str(date,VR::DA,study.date.as_str())?;
			ds.put_str(time,VR::TM,study.time.as_str())?;
		}
		text(&mut ds,tags::ACCESSION_NUMBER,VR::SH,&study.accession_number)?;
		ds.put_str(tags::MODALITY,VR::CS,series.modality.code())?;
		ds.put_str(tags::MANUFACTURER,VR::LO,MANUFACTURER)?;
		ds.put_str(tags::REFERRING_PHYSICIAN_NAME,VR::PN,"")?;
		text(&mut ds,tags::STUDY_DESCRIPTION,VR::LO,&study.description)?;
		text(&mut ds,tags::SERIES_DESCRIPTION,VR::LO,&series.description)?;
		text(&mut ds,tags::MANUFACTURER_MODEL_NAME,VR::LO,&self.settings.implementation_version_name)?;
		text(&mut ds,tags::PATIENT_NAME,VR::PN,&patient.name)?;
		text(&mut ds,tags::PATIENT_ID,VR::LO,&patient.id)?;
		text(&mut ds,tags::PATIENT_BIRTH_DATE,VR::DA,&patient.birth_date)?;
		text(&mut ds,tags::PATIENT_SEX,VR::CS,&patient.sex)?;
		text(&mut ds,tags::BODY_PART_EXAMINED,VR::CS,&series.body_part.to_ascii_uppercase())?;
		ds.put_str(tags::STUDY_INSTANCE_UID,VR::UI,study.uid.as_str())?;
		ds.put_str(tags::SERIES_INSTANCE_UID,VR::UI,series.uid.as_str())?;
		text(&mut ds,tags::STUDY_ID,VR::SH,&study.accession_number)?;
		ds.put_str(tags::SERIES_NUMBER,VR::IS,series.number.to_string())?;
		ds.put_str(tags::INSTANCE_NUMBER,VR::IS,image.instance_number.to_string())?;

		match (image.geometry,pixels) {
			(Some(geometry),Some(pixels)) => {
				ds.put_str(tags::IMAGE_TYPE,VR::CS,"ORIGINAL\\PRIMARY")?;
				ds.put_u16(tags::SAMPLES_PER_PIXEL,geometry.samples_per_pixel)?;
				ds.put_str(tags::PHOTOMETRIC_INTERPRETATION,VR::CS,geometry.photometric_interpretation)?;
				ds.put_u16(tags::ROWS,geometry.rows)?;
				ds.put_u16(tags::COLUMNS,geometry.columns)?;
				ds.put_u16(tags::BITS_ALLOCATED,geometry.bits_allocated)?;
				ds.put_u16(tags::BITS_STORED,geometry.bits_stored)?;
				ds.put_u16(tags::HIGH_BIT,geometry.high_bit)?;
				ds.put_u16(tags::PIXEL_REPRESENTATION,0)?;
				let range = geometry.max_value() as u64 + 1;
				ds.put_str(tags::WINDOW_CENTER,VR::DS,(range/2).to_string())?;
				ds.put_str(tags::WINDOW_WIDTH,VR::DS,range.to_string())?;
				let vr = if geometry.bits_allocated == 8 {VR::OB} else {VR::OW};
				ds.insert(Element::new(tags::PIXEL_DATA,vr,Value::Bytes(pixels.to_vec())))?;
			}
			_ if series.modality == Modality::SR => structured_report(&mut ds,study,series)?,
			_ => {}
		}
		let charset = if ds.is_ascii() {LATIN1} else {UTF8};
		ds.put_str(tags::SPECIFIC_CHARACTER_SET,VR::CS,charset)?;
		Ok(ds)
	}
}

/// meta elements after the group length, measured before the length is written
fn write_meta(meta:&DataSet,out:&mut Vec<u8>) -> Result<()>
{
	let body = meta.to_bytes()?;
	let length = u32::try_from(body.len())
		.map_err(|_|violation(format!("meta information of {} bytes",body.len())))?;
	Element::new(tags::FILE_META_INFORMATION_GROUP_LENGTH,VR::UL,Value::U32(vec![length])).write_to(out)?;
	out.extend(body);
	Ok(())
}

fn code_item(value:&str,scheme:&str,meaning:&str) -> Result<DataSet>
{
	let mut item = DataSet::new();
	item.put_str(tags::CODE_VALUE,VR::SH,value)?;
	item.put_str(tags::CODING_SCHEME_DESIGNATOR,VR::SH,scheme)?;
	item.put_str(tags::CODE_MEANING,VR::LO,meaning)?;
	Ok(item)
}

fn structured_report(ds:&mut DataSet,study:&Study,series:&Series) -> Result<()>
{
	ds.put_str(tags::VALUE_TYPE,VR::CS,"CONTAINER")?;
	ds.insert(Element::new(tags::CONCEPT_NAME_CODE_SEQUENCE,VR::SQ,Value::Items(vec![
		code_item("11528-7","LN","Radiology Report")?
	])))?;
	ds.put_str(tags::CONTINUITY_OF_CONTENT,VR::CS,"SEPARATE")?;
	ds.put_str(tags::COMPLETION_FLAG,VR::CS,"COMPLETE")?;
	ds.put_str(tags::VERIFICATION_FLAG,VR::CS,"UNVERIFIED")?;

	let findings = format!(
		"Synthetic report for {} ({}). Region: {}. No acute findings. Generated by {} for testing only.",
		study.description,study.accession_number,series.body_part,MANUFACTURER
	);
	let mut text_item = DataSet::new();
	text_item.put_str(tags::RELATIONSHIP_TYPE,VR::CS,"CONTAINS")?;
	text_item.put_str(tags::VALUE_TYPE,VR::CS,"TEXT")?;
	text_item.insert(Element::new(tags::CONCEPT_NAME_CODE_SEQUENCE,VR::SQ,Value::Items(vec![
		code_item("121071","DCM","Finding")?
	])))?;
	text_item.put_str(tags::TEXT_VALUE,VR::UT,findings)?;
	ds.insert(Element::new(tags::CONTENT_SEQUENCE,VR::SQ,Value::Items(vec![text_item])))
}
