use std::path::{Component, Path, PathBuf};
use serde::{Serialize, Serializer};
use serde::ser::SerializeStruct;
use strfmt::{strfmt_map, FmtError};
use tokio::io::AsyncWriteExt;
use crate::dcm::{EncodedObject, PathHint};
use crate::tools::{Context, Error, Result};

pub enum WriteResult {
	Written{filename:String,md5:String,size:usize},
	Failed{filename:String,error:Error},
}

impl WriteResult {
	pub fn is_ok(&self) -> bool {matches!(self,WriteResult::Written {..})}
}

impl Serialize for WriteResult
{
	fn serialize<S>(&self, s: S) -> std::result::Result<S::Ok, S::Error> where S: Serializer {
		match self {
			WriteResult::Written { filename, md5, size } => {
				let mut s=s.serialize_struct("written",3)?;
				s.serialize_field("filename",filename)?;
				s.serialize_field("md5",md5)?;
				s.serialize_field("size",size)?;
				s.end()
			}
			WriteResult::Failed { filename,error} => {
				let mut s=s.serialize_struct("failed",3)?;
				s.serialize_field("filename", filename)?;
				s.serialize_field("error", error.to_string().as_str())?;
				let chain:Vec<_>= error.sources().skip(1).map(|e|e.to_string()).collect();
				if !chain.is_empty() {
					s.serialize_field("causation",&chain)?;
				}
				s.end()
			}
		}
	}
}

fn format_hint(mut f:strfmt::Formatter, hint:&PathHint) -> strfmt::Result<()>
{
	let val = match f.key {
		"StudyInstanceUID" => hint.study_uid.to_string(),
		"SOPInstanceUID" => hint.sop_instance_uid.to_string(),
		"SeriesNumber" => hint.series_number.to_string(),
		"InstanceNumber" => hint.instance_number.to_string(),
		"Modality" => hint.modality.to_string(),
		key => return Err(FmtError::KeyError(format!(r#"Key "{key}" is not known"#))),
	};
	let mut val = val.as_str();
	if let Some(width)=f.width()
	{
		// "<" keeps the start, ">" keeps the end of values that are too long
		match f.align()
		{
			strfmt::Alignment::Left if val.len()>width => val = &val[..width],
			strfmt::Alignment::Right if val.len()>width => val = &val[val.len()-width..],
			_ => {}
		}
	}
	f.str(val)
}

/// Relative file name for an object according to `pattern`.
pub fn render_path(pattern:&str,hint:&PathHint) -> Result<PathBuf>
{
	let path = PathBuf::from(
		strfmt_map(pattern,|f|format_hint(f,hint))
			.context(format!("generating filename using pattern '{pattern}'"))?
	);
	if !path.components().all(|c|matches!(c,Component::Normal(_))) {
		return Err(Error::InvalidFilename {name:path});
	}
	Ok(path)
}

/// writes `bytes` to a new file, never replaces existing files
pub async fn write_file(path:&Path,bytes:&[u8]) -> Result<md5::Digest>
{
	if let Some(parent) = path.parent() {
		tokio::fs::create_dir_all(parent).await.context(format!("Failed creating storage path {:?}",parent))?;
	}
	let mut file = tokio::fs::OpenOptions::new()
		.write(true).create_new(true)
		.open(path).await
		.context(format!("Failed to create {}",path.display()))?;
	file.write_all(bytes).await.context(format!("Failed to write {}",path.display()))?;
	file.flush().await?;
	Ok(md5::compute(bytes))
}

/// Stores an encoded object below `root` and reports the outcome.
pub async fn store(root:&Path,pattern:&str,object:EncodedObject) -> WriteResult
{
	let filename = match render_path(pattern,&object.hint) {
		Ok(relative) => root.join(relative),
		Err(error) => return WriteResult::Failed {filename:object.hint.to_string(),error},
	};
	match write_file(&filename,&object.bytes).await {
		Ok(md5) => {
			tracing::debug!("stored {}",filename.display());
			WriteResult::Written {
				filename:filename.to_string_lossy().to_string(),
				md5:format!("{:x}",md5),
				size:object.bytes.len()
			}
		}
		Err(error) => WriteResult::Failed {filename:filename.to_string_lossy().to_string(),error},
	}
}
