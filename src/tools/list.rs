use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use byte_unit::Byte;
use byte_unit::UnitType::Binary;
use clap::ValueEnum;
use dicom::dictionary_std::tags;
use glob::{glob, Pattern};
use itertools::Itertools;
use serde::Serialize;
use tracing::warn;
use crate::dcm::decode;
use crate::tools::{Context, Error, Result};

#[derive(Clone,Copy,Debug,PartialEq,Eq,ValueEnum)]
pub enum ListFormat {
	Table,
	Json,
}

/// Per-study overview of what is stored under an output root.
#[derive(Debug,Clone,Default,Serialize)]
pub struct StudySummary {
	pub study_uid:String,
	pub patient_name:String,
	pub patient_id:String,
	pub study_date:String,
	pub accession_number:String,
	pub description:String,
	pub modalities:Vec<String>,
	pub series_count:usize,
	pub image_count:usize,
	pub total_bytes:u64,
}

struct Instance {
	patient_name:String,
	patient_id:String,
	study_date:String,
	accession_number:String,
	description:String,
	modality:String,
	series_uid:String,
	size:u64,
}

async fn read_instance(path:PathBuf) -> Result<(String,Instance)>
{
	let bytes = tokio::fs::read(&path).await.context(format!("reading {}",path.display()))?;
	let obj = decode(&bytes).context(format!("decoding {}",path.display()))?;
	let text = |tag| obj.string(tag).unwrap_or_default().to_string();
	let study_uid = obj.string(tags::STUDY_INSTANCE_UID)
		.ok_or(Error::NotFound)
		.context(format!("looking for the study uid in {}",path.display()))?
		.to_string();
	Ok((study_uid,Instance{
		patient_name:text(tags::PATIENT_NAME),
		patient_id:text(tags::PATIENT_ID),
		study_date:text(tags::STUDY_DATE),
		accession_number:text(tags::ACCESSION_NUMBER),
		description:text(tags::STUDY_DESCRIPTION),
		modality:text(tags::MODALITY),
		series_uid:text(tags::SERIES_INSTANCE_UID),
		size:bytes.len() as u64,
	}))
}

/// Scans all `.dcm` files below `root` and groups them by study.
///
/// Files that can't be read are logged and skipped.
pub async fn list_studies(root:&Path) -> Result<Vec<StudySummary>>
{
	let pattern = format!("{}/**/*.dcm",Pattern::escape(&root.to_string_lossy()));
	let files = glob(&pattern)
		.map_err(|e|Error::GlobbingError {pattern:pattern.clone(),err:e})?
		.filter_map(|f|f.ok())
		.filter(|f|f.is_file());

	let mut tasks = tokio::task::JoinSet::new();
	for file in files {
		tasks.spawn(read_instance(file));
	}
	let mut instances = Vec::new();
	while let Some(result) = tasks.join_next().await {
		match result? {
			Ok(instance) => instances.push(instance),
			Err(e) => warn!("{e}"),
		}
	}

	let summaries = instances.into_iter()
		.into_group_map()
		.into_iter()
		.map(|(study_uid,instances)|{
			let first = &instances[0];
			let modalities:BTreeSet<_> = instances.iter().map(|i|i.modality.clone()).collect();
			let series:BTreeSet<_> = instances.iter().map(|i|i.series_uid.as_str()).collect();
			StudySummary{
				patient_name:first.patient_name.clone(),
				patient_id:first.patient_id.clone(),
				study_date:first.study_date.clone(),
				accession_number:first.accession_number.clone(),
				description:first.description.clone(),
				modalities:modalities.into_iter().collect(),
				series_count:series.len(),
				image_count:instances.len(),
				total_bytes:instances.iter().map(|i|i.size).sum(),
				study_uid,
			}
		})
		.sorted_by(|a,b|(&a.study_date,&a.study_uid).cmp(&(&b.study_date,&b.study_uid)))
		.collect();
	Ok(summaries)
}

/// human readable table, one study per line
pub fn render_table(studies:&[StudySummary]) -> String
{
	let header = format!("{:<64}  {:<24}  {:<8}  {:<8}  {:>6}  {:>6}  {:>10}","STUDY UID","PATIENT","DATE","MODALITY","SERIES","IMAGES","SIZE");
	let rows = studies.iter().map(|s|format!("{:<64}  {:<24}  {:<8}  {:<8}  {:>6}  {:>6}  {:>10}",
		s.study_uid,s.patient_name,s.study_date,s.modalities.join(","),s.series_count,s.image_count,
		format!("{:.1}",Byte::from(s.total_bytes).get_appropriate_unit(Binary))
	));
	let footer = format!("{} studies, {} images",studies.len(),studies.iter().map(|s|s.image_count).sum::<usize>());
	std::iter::once(header).chain(rows).chain(std::iter::once(footer)).join("\n")
}

pub fn render(studies:&[StudySummary],format:ListFormat) -> Result<String>
{
	match format {
		ListFormat::Table => Ok(render_table(studies)),
		ListFormat::Json => serde_json::to_string_pretty(studies).map_err(Error::from),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn table_has_one_line_per_study()
	{
		assert_eq!(render_table(&[]).lines().count(), 2);
		let study = StudySummary{
			study_uid:"1.2.3".into(),
			patient_name:"DOE^JANE".into(),
			study_date:"20240102".into(),
			modalities:vec!["CT".into(),"SR".into()],
			series_count:2,
			image_count:5,
			total_bytes:2048,
			..Default::default()
		};
		let table = render_table(&[study.clone(),study]);
		let lines:Vec<_> = table.lines().collect();
		assert_eq!(lines.len(), 4);
		assert!(lines[0].starts_with("STUDY UID"));
		assert!(lines[1].starts_with("1.2.3 "));
		assert!(lines[1].contains("CT,SR"));
		assert!(lines[1].ends_with("KiB"));
		assert_eq!(lines[3], "2 studies, 10 images");
	}
}
