use std::collections::HashSet;
use dicom::dictionary_std::{tags, uids};
use rand::SeedableRng;
use rand::rngs::StdRng;
use dicomsynth::dcm::decode;
use dicomsynth::Encoder;
use dicomsynth::model::Modality;
use crate::common::{generator, params};

mod common;

#[test]
fn ct_two_series_three_images() -> Result<(), Box<dyn std::error::Error>>
{
	let p = params("CT",2,3);
	let report = generator().generate(&p,&mut StdRng::seed_from_u64(42))?;
	assert!(report.failures.is_empty());
	assert!(report.warnings.is_empty());
	assert_eq!(report.studies.len(), 1);
	let study = &report.studies[0];

	let encoding = Encoder::default().encode_study(study);
	assert!(encoding.failed.is_empty());
	assert_eq!(encoding.encoded.len(), 6);

	let mut sop_uids = HashSet::new();
	let mut series_uids = HashSet::new();
	for (n,object) in encoding.encoded.iter().enumerate() {
		let (series_number,instance_number) = (n as u32/3+1, n as u32%3+1);
		assert_eq!((object.hint.series_number,object.hint.instance_number), (series_number,instance_number));
		assert_eq!(object.hint.to_string(), format!("{}/series_{:03}/image_{:03}.dcm",study.uid,series_number,instance_number));

		let obj = decode(&object.bytes)?;
		obj.check_invariants()?;
		assert_eq!(obj.string(tags::STUDY_INSTANCE_UID), Some(study.uid.as_str()));
		assert_eq!(obj.string(tags::MODALITY), Some("CT"));
		assert_eq!(obj.string(tags::SOP_CLASS_UID), Some(uids::CT_IMAGE_STORAGE));
		assert_eq!(obj.string(tags::SERIES_NUMBER), Some(series_number.to_string().as_str()));
		assert_eq!(obj.string(tags::INSTANCE_NUMBER), Some(instance_number.to_string().as_str()));
		assert_eq!(obj.uint16(tags::ROWS), Some(48));
		assert_eq!(obj.uint16(tags::COLUMNS), Some(64));
		assert_eq!(obj.pixel_data().map(<[u8]>::len), Some(64*48*2));
		assert!(sop_uids.insert(obj.string(tags::SOP_INSTANCE_UID).unwrap_or_default().to_string()));
		series_uids.insert(obj.string(tags::SERIES_INSTANCE_UID).unwrap_or_default().to_string());
	}
	assert_eq!(sop_uids.len(), 6);
	assert_eq!(series_uids.len(), 2);
	assert!(!series_uids.contains(study.uid.as_str()));
	Ok(())
}

#[test]
fn structured_report_has_no_pixels() -> Result<(), Box<dyn std::error::Error>>
{
	let p = params("SR",1,1);
	let report = generator().generate(&p,&mut StdRng::seed_from_u64(1))?;
	let study = &report.studies[0];
	let image = &study.series()[0].images()[0];
	assert!(image.geometry.is_none());
	assert!(image.pixels().is_none());

	let encoding = Encoder::default().encode_study(study);
	let obj = decode(&encoding.encoded[0].bytes)?;
	obj.check_invariants()?;
	assert_eq!(obj.string(tags::SOP_CLASS_UID), Some(uids::BASIC_TEXT_SR_STORAGE));
	assert!(obj.element(tags::PIXEL_DATA).is_none());
	assert!(obj.element(tags::ROWS).is_none());
	assert_eq!(obj.string(tags::VALUE_TYPE), Some("CONTAINER"));
	assert_eq!(obj.string(tags::COMPLETION_FLAG), Some("COMPLETE"));
	let content = obj.items(tags::CONTENT_SEQUENCE).expect("content sequence");
	assert_eq!(content.len(), 1);
	let text = content[0].get(tags::TEXT_VALUE).expect("text value");
	assert!(matches!(&text.value, dicomsynth::dcm::Value::Str(s) if s.contains("chest")));
	Ok(())
}

#[test]
fn studies_in_the_same_tick_differ() -> Result<(), Box<dyn std::error::Error>>
{
	// both builders use the same fixed timestamp
	let p = dicomsynth::GenerationParams{study_count:2,..params("MR",1,1)};
	let report = generator().generate(&p,&mut StdRng::seed_from_u64(3))?;
	assert_eq!(report.studies.len(), 2);
	assert_eq!(report.studies[0].date, report.studies[1].date);
	assert_eq!(report.studies[0].time, report.studies[1].time);
	assert_ne!(report.studies[0].uid, report.studies[1].uid);

	let other = generator().generate(&params("MR",1,1),&mut StdRng::seed_from_u64(3))?;
	assert_ne!(other.studies[0].uid, report.studies[0].uid);
	Ok(())
}

#[test]
fn every_modality_generates() -> Result<(), Box<dyn std::error::Error>>
{
	let encoder = Encoder::default();
	for modality in Modality::ALL.into_iter().filter(|m|*m != Modality::OT) {
		let report = generator().generate(&params(modality.code(),1,1),&mut StdRng::seed_from_u64(8))?;
		assert!(report.failures.is_empty(), "{modality}");
		let encoding = encoder.encode_study(&report.studies[0]);
		assert_eq!(encoding.encoded.len(), 1, "{modality}");
		decode(&encoding.encoded[0].bytes)?.check_invariants()?;
	}
	Ok(())
}
