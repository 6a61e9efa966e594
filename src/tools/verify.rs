use std::path::PathBuf;
use dicom::dictionary_std::tags;
use glob::glob;
use serde::{Serialize, Serializer};
use serde::ser::SerializeStruct;
use crate::dcm::decode;
use crate::tools::{Context, Error, Result};

pub enum VerifyResult {
	Valid{filename:String,md5:String,sop_instance_uid:String},
	Invalid{filename:String,error:Error},
}

impl VerifyResult {
	pub fn is_valid(&self) -> bool {matches!(self,VerifyResult::Valid {..})}
	pub fn filename(&self) -> &str
	{
		match self {
			VerifyResult::Valid {filename,..} | VerifyResult::Invalid {filename,..} => filename
		}
	}
}

impl Serialize for VerifyResult
{
	fn serialize<S>(&self, s: S) -> std::result::Result<S::Ok, S::Error> where S: Serializer {
		match self {
			VerifyResult::Valid { filename, md5, sop_instance_uid } => {
				let mut s=s.serialize_struct("valid",3)?;
				s.serialize_field("filename",filename)?;
				s.serialize_field("md5",md5)?;
				s.serialize_field("sop_instance_uid",sop_instance_uid)?;
				s.end()
			}
			VerifyResult::Invalid { filename,error} => {
				let mut s=s.serialize_struct("invalid",2)?;
				s.serialize_field("filename", filename)?;
				s.serialize_field("error", error.root_cause().to_string().as_str())?;
				s.end()
			}
		}
	}
}

/// re-reads one file and checks everything the encoder guarantees
pub async fn verify_file(path:PathBuf) -> VerifyResult
{
	let filename = path.to_string_lossy().to_string();
	let checked = async {
		let bytes = tokio::fs::read(&path).await.context(format!("reading {filename}"))?;
		let obj = decode(&bytes)?;
		obj.check_invariants()?;
		let uid = obj.string(tags::SOP_INSTANCE_UID).unwrap_or_default().to_string();
		Ok::<_,Error>((format!("{:x}",md5::compute(&bytes)),uid))
	};
	match checked.await {
		Ok((md5,sop_instance_uid)) => VerifyResult::Valid {filename,md5,sop_instance_uid},
		Err(error) => VerifyResult::Invalid {filename,error},
	}
}

/// Verifies all files matching the globbing pattern, sorted by filename.
pub async fn verify_glob<T>(pattern:T) -> Result<Vec<VerifyResult>> where T:AsRef<str>
{
	let mut jobs=tokio::task::JoinSet::new();
	let files = glob(pattern.as_ref())
		.map_err(|e|Error::GlobbingError{pattern:pattern.as_ref().to_string(),err:e})?
		.filter_map(|f|f.ok())
		.filter(|f|f.is_file());
	for file in files
	{
		jobs.spawn(verify_file(file));
	}
	if jobs.is_empty() {
		return Err(Error::NotFound.context(format!("when looking for files in {}",pattern.as_ref())));
	}
	let mut ret=Vec::new();
	while let Some(result) = jobs.join_next().await {
		ret.push(result?);
	}
	ret.sort_by(|a,b|a.filename().cmp(b.filename()));
	Ok(ret)
}
