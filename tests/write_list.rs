use std::path::Path;
use dicomsynth::tools::create::{create, CreateOptions};
use dicomsynth::tools::list::{list_studies, render, ListFormat};
use dicomsynth::tools::verify::verify_glob;
use dicomsynth::tools::write::WriteResult;
use dicomsynth::{Encoder, GenerationParams};
use crate::common::params;

mod common;

const PATTERN:&str = "{StudyInstanceUID}/series_{SeriesNumber:0>3}/image_{InstanceNumber:0>3}.dcm";

fn options(params:GenerationParams,root:&Path) -> CreateOptions
{
	CreateOptions{
		params,
		output_root:root.to_path_buf(),
		filename_pattern:PATTERN.into(),
		encoder:Encoder::default(),
		seed:Some(17),
		parallelism:2,
	}
}

#[tokio::test]
async fn create_list_verify() -> Result<(), Box<dyn std::error::Error>>
{
	let dir = tempfile::tempdir()?;
	let p = GenerationParams{study_count:2,patient_name:Some("DOE^JANE".into()),..params("CT",2,2)};
	let mut results = Vec::new();
	let summary = create(options(p,dir.path()),|r|results.push(serde_json::to_value(r).unwrap())).await?;
	assert_eq!(summary.studies.len(), 2);
	assert_eq!(summary.written, 8);
	assert_eq!(summary.failed, 0);
	assert_eq!(results.len(), 8);
	assert!(results.iter().all(|r|r["md5"].is_string() && r["filename"].is_string()));
	for uid in &summary.studies {
		assert!(dir.path().join(uid.as_str()).join("series_002").join("image_002.dcm").is_file());
	}

	let studies = list_studies(dir.path()).await?;
	assert_eq!(studies.len(), 2);
	for study in &studies {
		assert!(summary.studies.iter().any(|uid|uid.as_str() == study.study_uid));
		assert_eq!(study.patient_name, "DOE^JANE");
		assert_eq!(study.modalities, vec!["CT".to_string()]);
		assert_eq!(study.series_count, 2);
		assert_eq!(study.image_count, 4);
		assert!(study.total_bytes > 4*64*48*2);
	}
	let table = render(&studies,ListFormat::Table)?;
	assert!(table.ends_with("2 studies, 8 images"));
	let json:serde_json::Value = serde_json::from_str(&render(&studies,ListFormat::Json)?)?;
	assert_eq!(json.as_array().map(Vec::len), Some(2));

	let verified = verify_glob(format!("{}/**/*.dcm",dir.path().display())).await?;
	assert_eq!(verified.len(), 8);
	assert!(verified.iter().all(|v|v.is_valid()));
	Ok(())
}

#[tokio::test]
async fn damaged_files_are_reported() -> Result<(), Box<dyn std::error::Error>>
{
	let dir = tempfile::tempdir()?;
	let mut written = Vec::new();
	create(options(params("US",1,2),dir.path()),|r|if let WriteResult::Written {filename,..} = r {
		written.push(filename.clone())
	}).await?;
	assert_eq!(written.len(), 2);
	written.sort();

	// cut the pixel data short
	let bytes = std::fs::read(&written[0])?;
	std::fs::write(&written[0],&bytes[..bytes.len()-10])?;

	let verified = verify_glob(format!("{}/**/*.dcm",dir.path().display())).await?;
	assert_eq!(verified.len(), 2);
	assert_eq!(verified[0].filename(), written[0]);
	assert!(!verified[0].is_valid());
	assert!(verified[1].is_valid());
	let report = serde_json::to_value(&verified[0])?;
	assert!(report["error"].is_string());

	// listing skips what it can't read
	let studies = list_studies(dir.path()).await?;
	assert_eq!(studies[0].image_count, 1);
	Ok(())
}

#[tokio::test]
async fn unsupported_modality_fails_per_image() -> Result<(), Box<dyn std::error::Error>>
{
	let dir = tempfile::tempdir()?;
	let mut failed = 0;
	let summary = create(options(params("OT",1,3),dir.path()),|r|if !r.is_ok() {failed+=1}).await?;
	assert_eq!(summary.written, 0);
	assert_eq!(summary.failed, 3);
	assert_eq!(failed, 3);
	assert_eq!(summary.studies.len(), 1);
	assert!(verify_glob(format!("{}/**/*.dcm",dir.path().display())).await.is_err());
	Ok(())
}

#[tokio::test]
async fn invalid_requests_are_rejected() -> Result<(), Box<dyn std::error::Error>>
{
	let dir = tempfile::tempdir()?;
	for p in [
		params("XX",1,1),
		GenerationParams{image_count:0,..params("CT",1,1)},
		GenerationParams{org_root:"1.02.3".into(),..params("CT",1,1)},
	] {
		assert!(create(options(p,dir.path()),|_|{}).await.is_err());
	}
	assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
	Ok(())
}
