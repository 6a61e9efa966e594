use std::collections::BTreeMap;
use std::path::PathBuf;
use config::{Config, File, FileFormat::Toml};
use std::sync::OnceLock;
use serde::{Deserialize, Serialize};
use crate::dcm::EncoderSettings;
use crate::generate::GenerationParams;
use crate::tools::{Context, Error, Result};

static CONFIG:OnceLock<AppConfig> = OnceLock::new();

static CONFIG_STR:&str = r#"
org_root = "1.2.826.0.1.3680043.10.1071" # generated identifiers are <org_root>.<random>

output_root = "studies" # used if --output-dir is not given
filename_pattern = "{StudyInstanceUID}/series_{SeriesNumber:0>3}/image_{InstanceNumber:0>3}.dcm"

implementation_class_uid = "1.2.826.0.1.3680043.10.1071.1"
implementation_version_name = "DICOMSYNTH_01"
source_ae_title = "DICOMSYNTH"

[templates.chest-xray]
description = "Chest X-Ray (PA and Lateral)"
modality = "CR"
series_count = 1
image_count = 2
anatomical_region = "chest"

[templates.ct-chest]
description = "CT Chest with contrast"
modality = "CT"
series_count = 2
image_count = 50
anatomical_region = "chest"

[templates.ultrasound-abdomen]
description = "Abdominal Ultrasound"
modality = "US"
series_count = 1
image_count = 10
anatomical_region = "abdomen"

[templates.mammography]
description = "Bilateral Screening Mammography"
modality = "MG"
series_count = 1
image_count = 4
anatomical_region = "breast"

[templates.digital-xray]
description = "Digital X-Ray"
modality = "DX"
series_count = 1
image_count = 1
anatomical_region = "chest"

[templates.mri-brain]
description = "MRI Brain without contrast"
modality = "MR"
series_count = 3
image_count = 30
anatomical_region = "brain"
"#;

/// A named preset for the create command.
#[derive(Debug,Clone,Deserialize,Serialize)]
pub struct Template {
	pub description:String,
	pub modality:String,
	pub series_count:u32,
	pub image_count:u32,
	pub anatomical_region:String,
}

impl Template {
	/// request parameters with this template's values filled in
	pub fn apply(&self,params:GenerationParams) -> GenerationParams
	{
		GenerationParams{
			modality:self.modality.clone(),
			series_count:self.series_count,
			image_count:self.image_count,
			anatomical_region:self.anatomical_region.clone(),
			study_description:params.study_description.or(Some(self.description.clone())),
			..params
		}
	}
}

#[derive(Debug,Clone,Deserialize)]
pub struct AppConfig {
	pub org_root:String,
	pub output_root:PathBuf,
	pub filename_pattern:String,
	pub implementation_class_uid:String,
	pub implementation_version_name:String,
	pub source_ae_title:Option<String>,
	#[serde(default)]
	pub templates:BTreeMap<String,Template>,
}

impl AppConfig {
	pub fn encoder_settings(&self) -> EncoderSettings
	{
		EncoderSettings{
			implementation_class_uid:self.implementation_class_uid.clone(),
			implementation_version_name:self.implementation_version_name.clone(),
			source_ae_title:self.source_ae_title.clone().filter(|ae|!ae.is_empty()),
		}
	}
	pub fn template(&self,name:&str) -> Result<&Template>
	{
		self.templates.get(name).ok_or_else(||Error::TemplateNotFound {
			name:name.into(),
			available:self.templates.keys().cloned().collect()
		})
	}
}

/// builds the configuration from the defaults and an optional user file on top
pub fn load(config_file:Option<PathBuf>) -> Result<AppConfig>
{
	let mut builder = Config::builder()
		.add_source(File::from_str(CONFIG_STR,Toml));
	if let Some(filename) = config_file {
		let name = filename.to_str().ok_or_else(||Error::InvalidFilename {name:filename.clone()})?;
		builder=builder.add_source(File::new(name,Toml));
	}
	builder.build()?
		.try_deserialize()
		.context("reading configuration")
}

pub fn init(config_file:Option<PathBuf>) -> Result<()>{
	let config = load(config_file)?;
	if CONFIG.set(config).is_err() {
		tracing::warn!("configuration was already initialized, keeping the first one");
	}
	Ok(())
}

pub fn write(path:PathBuf) -> Result<()>
{
	std::fs::write(&path,CONFIG_STR).context(format!("writing default config to {}",path.to_string_lossy()))
}

pub fn get() -> &'static AppConfig
{
	CONFIG.get().expect("accessing uninitialized global config")
}
