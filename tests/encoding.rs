use dicom::dictionary_std::{tags, uids};
use rand::SeedableRng;
use rand::rngs::StdRng;
use dicomsynth::dcm::{decode, EncoderSettings};
use dicomsynth::model::Modality;
use dicomsynth::{Encoder, GenerationParams};
use crate::common::{generator, params, parse_with_dicom, text};

mod common;

fn encode(p:&GenerationParams,seed:u64) -> Result<Vec<Vec<u8>>, Box<dyn std::error::Error>>
{
	let report = generator().generate(p,&mut StdRng::seed_from_u64(seed))?;
	let mut ret = Vec::new();
	for study in &report.studies {
		let encoding = Encoder::default().encode_study(study);
		assert!(encoding.failed.is_empty());
		ret.extend(encoding.encoded.into_iter().map(|o|o.bytes));
	}
	Ok(ret)
}

#[test]
fn pixels_survive_for_every_geometry() -> Result<(), Box<dyn std::error::Error>>
{
	let encoder = Encoder::default();
	let with_pixels = Modality::ALL.into_iter().filter(|m|m.info().is_ok_and(|i|i.geometry.is_some()));
	for modality in with_pixels {
		for (width,height,bits) in [(7,5,8),(8,6,12),(9,3,16),(16,16,1)] {
			let p = GenerationParams{width:Some(width),height:Some(height),bits:Some(bits),..params(modality.code(),1,1)};
			let report = generator().generate(&p,&mut StdRng::seed_from_u64(5))?;
			let study = &report.studies[0];
			let series = &study.series()[0];
			let image = &series.images()[0];
			let bytes = encoder.encode_object(&study.patient,study,series,image,image.pixels())?;

			let obj = decode(&bytes)?;
			obj.check_invariants()?;
			let what = format!("{modality} {width}x{height}x{bits}");
			assert_eq!(obj.uint16(tags::COLUMNS), Some(width), "{what}");
			assert_eq!(obj.uint16(tags::ROWS), Some(height), "{what}");
			assert_eq!(obj.uint16(tags::BITS_STORED), Some(bits), "{what}");
			assert_eq!(obj.uint16(tags::BITS_ALLOCATED), Some(bits.div_ceil(8)*8), "{what}");
			assert_eq!(obj.uint16(tags::HIGH_BIT), Some(bits-1), "{what}");
			assert_eq!(obj.string(tags::PHOTOMETRIC_INTERPRETATION), Some("MONOCHROME2"), "{what}");
			assert_eq!(obj.pixel_data(), image.pixels(), "{what}");
			assert_eq!(bytes.len() % 2, 0, "{what}");
		}
	}
	Ok(())
}

#[test]
fn meta_group_length_matches() -> Result<(), Box<dyn std::error::Error>>
{
	let report = generator().generate(&params("MR",1,2),&mut StdRng::seed_from_u64(9))?;
	let mut lengths:Vec<Vec<u32>> = Vec::new();
	// an odd version name gets a padding byte inside the meta group
	for version in ["DICOMSYNTH_01","DICOMSYNTH_0_1"] {
		let encoder = Encoder::new(EncoderSettings{
			implementation_version_name:version.into(),
			..Default::default()
		});
		let mut declared_lengths = Vec::new();
		for object in encoder.encode_study(&report.studies[0]).encoded {
			let bytes = object.bytes;
			let declared = u32::from_le_bytes([bytes[140],bytes[141],bytes[142],bytes[143]]);
			let obj = decode(&bytes)?;
			assert_eq!(obj.declared_meta_length, declared);
			assert_eq!(obj.measured_meta_length, declared as usize);
			assert_eq!(obj.string(tags::IMPLEMENTATION_VERSION_NAME), Some(version));

			let parsed = parse_with_dicom(&bytes)?;
			assert_eq!(parsed.meta().information_group_length, declared);
			assert_eq!(parsed.meta().implementation_version_name.as_deref().map(str::trim_end), Some(version));
			declared_lengths.push(declared);
		}
		lengths.push(declared_lengths);
	}
	// both names take 14 bytes once padded
	assert_eq!(lengths[0], lengths[1]);
	Ok(())
}

#[test]
fn odd_values_are_padded() -> Result<(), Box<dyn std::error::Error>>
{
	let p = GenerationParams{patient_name:Some("DOE^JON".into()),..params("CT",1,1)};
	let bytes = encode(&p,1)?.remove(0);
	let padded = b"\x10\x00\x10\x00PN\x08\x00DOE^JON ";
	assert!(bytes.windows(padded.len()).any(|w|w == padded));

	// uids are padded with a zero byte
	let obj = decode(&bytes)?;
	let uid = obj.string(tags::SOP_INSTANCE_UID).unwrap_or_default();
	let mut header = vec![0x08,0x00,0x18,0x00,b'U',b'I'];
	header.extend_from_slice(&(uid.len() as u16 + uid.len() as u16 % 2).to_le_bytes());
	let start = bytes.windows(header.len()).position(|w|w == header.as_slice()).expect("sop instance uid");
	let value = &bytes[start+8..start+8+uid.len()+uid.len()%2];
	assert_eq!(&value[..uid.len()], uid.as_bytes());
	if uid.len() % 2 == 1 {
		assert_eq!(value[uid.len()], 0);
	}
	Ok(())
}

#[test]
fn tags_ascend() -> Result<(), Box<dyn std::error::Error>>
{
	for modality in ["CR","US","SR"] {
		for bytes in encode(&params(modality,1,1),4)? {
			let obj = decode(&bytes)?;
			let meta:Vec<_> = obj.meta().map(|e|e.tag).collect();
			assert!(meta.windows(2).all(|w|w[0] < w[1]), "{modality} meta");
			assert_eq!(meta.first(), Some(&tags::FILE_META_INFORMATION_VERSION));
			let elements:Vec<_> = obj.elements().map(|e|e.tag).collect();
			assert!(elements.windows(2).all(|w|w[0] < w[1]), "{modality} data set");
			assert!(elements.iter().all(|t|t.0 != 0x0002));
		}
	}
	Ok(())
}

#[test]
fn readable_by_the_dicom_crate() -> Result<(), Box<dyn std::error::Error>>
{
	for modality in ["CT","US"] {
		let p = GenerationParams{
			patient_name:Some("ROE^RICHARD".into()),
			patient_id:Some("PID00042".into()),
			accession_number:Some("ACC-7".into()),
			..params(modality,1,1)
		};
		let report = generator().generate(&p,&mut StdRng::seed_from_u64(21))?;
		let study = &report.studies[0];
		let image = &study.series()[0].images()[0];
		let bytes = Encoder::default().encode_study(study).encoded.remove(0).bytes;

		let parsed = parse_with_dicom(&bytes)?;
		assert_eq!(parsed.meta().transfer_syntax(), uids::EXPLICIT_VR_LITTLE_ENDIAN);
		assert_eq!(parsed.meta().media_storage_sop_instance_uid(), image.uid.as_str());
		assert_eq!(text(&parsed,tags::SOP_INSTANCE_UID)?, image.uid.as_str());
		assert_eq!(text(&parsed,tags::STUDY_INSTANCE_UID)?, study.uid.as_str());
		assert_eq!(text(&parsed,tags::PATIENT_NAME)?, "ROE^RICHARD");
		assert_eq!(text(&parsed,tags::PATIENT_ID)?, "PID00042");
		assert_eq!(text(&parsed,tags::ACCESSION_NUMBER)?, "ACC-7");
		assert_eq!(text(&parsed,tags::MODALITY)?, modality);
		assert_eq!(parsed.element(tags::ROWS)?.to_int::<u16>()?, 48);
		assert_eq!(parsed.element(tags::COLUMNS)?.to_int::<u16>()?, 64);
		let pixels = parsed.element(tags::PIXEL_DATA)?.to_bytes()?;
		assert_eq!(Some(pixels.as_ref()), image.pixels(), "{modality}");
	}
	Ok(())
}

#[test]
fn non_ascii_names_are_declared_as_utf8() -> Result<(), Box<dyn std::error::Error>>
{
	let p = GenerationParams{patient_name:Some("MÜLLER^JÖRG".into()),..params("CT",1,1)};
	let report = generator().generate(&p,&mut StdRng::seed_from_u64(13))?;
	let bytes = Encoder::default().encode_study(&report.studies[0]).encoded.remove(0).bytes;

	let name = "MÜLLER^JÖRG".as_bytes();
	assert!(bytes.windows(name.len()).any(|w|w == name));
	let obj = decode(&bytes)?;
	assert_eq!(obj.string(tags::SPECIFIC_CHARACTER_SET), Some("ISO_IR 192"));
	assert_eq!(obj.string(tags::PATIENT_NAME), Some("MÜLLER^JÖRG"));

	let parsed = parse_with_dicom(&bytes)?;
	assert_eq!(text(&parsed,tags::SPECIFIC_CHARACTER_SET)?, "ISO_IR 192");
	assert_eq!(text(&parsed,tags::PATIENT_NAME)?, "MÜLLER^JÖRG");

	// plain names keep the latin-1 declaration
	let report = generator().generate(&params("CT",1,1),&mut StdRng::seed_from_u64(13))?;
	let bytes = Encoder::default().encode_study(&report.studies[0]).encoded.remove(0).bytes;
	assert_eq!(text(&parse_with_dicom(&bytes)?,tags::SPECIFIC_CHARACTER_SET)?, "ISO_IR 100");
	Ok(())
}

#[test]
fn settings_go_into_the_meta_information() -> Result<(), Box<dyn std::error::Error>>
{
	let encoder = Encoder::new(EncoderSettings{
		implementation_class_uid:"1.2.3.4.5".into(),
		implementation_version_name:"TESTING".into(),
		source_ae_title:None,
	});
	let report = generator().generate(&params("DX",1,1),&mut StdRng::seed_from_u64(2))?;
	let bytes = encoder.encode_study(&report.studies[0]).encoded.remove(0).bytes;
	let obj = decode(&bytes)?;
	obj.check_invariants()?;
	assert_eq!(obj.string(tags::IMPLEMENTATION_CLASS_UID), Some("1.2.3.4.5"));
	assert_eq!(obj.string(tags::IMPLEMENTATION_VERSION_NAME), Some("TESTING"));
	assert!(obj.element(tags::SOURCE_APPLICATION_ENTITY_TITLE).is_none());
	assert_eq!(obj.bytes(tags::FILE_META_INFORMATION_VERSION), Some([0u8,1].as_slice()));
	Ok(())
}
