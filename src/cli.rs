use std::path::PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap::builder::PossibleValue;
use clap::ValueHint::{DirPath, FilePath};
use tracing::Level;
use dicomsynth::GenerationParams;
use dicomsynth::tools::list::ListFormat;

#[derive(Clone)]
pub(super) struct LogLevel(Level);

impl ValueEnum for LogLevel
{
	fn value_variants<'a>() -> &'a [Self]
	{
		&[
			LogLevel(Level::TRACE),
			LogLevel(Level::DEBUG),
			LogLevel(Level::INFO),
			LogLevel(Level::WARN),
			LogLevel(Level::ERROR)
		]
	}

	fn to_possible_value(&self) -> Option<PossibleValue> {
		let alias= self.0.to_string().to_lowercase();
		Some(PossibleValue::new(self.0.as_str()).alias(alias))
	}
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub(super) struct Cli {
	#[command(subcommand)]
	pub(super) command: Commands,
	/// config file
	#[arg(long, value_hint = FilePath)]
	pub(super) config: Option<PathBuf>,
	/// logging level
	#[arg(long, default_value = Level::WARN.as_str())]
	pub(super) log_level:LogLevel
}

#[derive(Args,Debug)]
pub(crate) struct CreateArgs {
	/// start from a template of the configuration (see the templates command)
	#[arg(long, short)]
	pub(crate) template: Option<String>,
	/// number of studies
	#[arg(long)]
	pub(crate) studies: Option<usize>,
	/// series per study
	#[arg(long)]
	pub(crate) series: Option<u32>,
	/// images per series
	#[arg(long)]
	pub(crate) images: Option<u32>,
	/// modality code (CR, CT, MR, US, DX, MG, NM, PT, RT, SR)
	#[arg(long, short)]
	pub(crate) modality: Option<String>,
	/// anatomical region, also used as body part
	#[arg(long)]
	pub(crate) region: Option<String>,
	#[arg(long)]
	pub(crate) patient_name: Option<String>,
	#[arg(long)]
	pub(crate) patient_id: Option<String>,
	#[arg(long)]
	pub(crate) accession: Option<String>,
	#[arg(long)]
	pub(crate) description: Option<String>,
	/// image width, overrides the modality default
	#[arg(long)]
	pub(crate) width: Option<u16>,
	/// image height, overrides the modality default
	#[arg(long)]
	pub(crate) height: Option<u16>,
	/// bits per pixel (1-16), overrides the modality default
	#[arg(long)]
	pub(crate) bits: Option<u16>,
	/// where to store the files, defaults to output_root of the config
	#[arg(long, short, value_hint = DirPath)]
	pub(crate) output_dir: Option<PathBuf>,
	/// seed for the pixel noise
	#[arg(long)]
	pub(crate) seed: Option<u64>,
	/// images encoded and written concurrently
	#[arg(long, default_value_t = 8)]
	pub(crate) jobs: usize,
	/// print every result as json
	#[arg(long,default_value_t=false)]
	pub(crate) json: bool,
}

impl CreateArgs {
	/// command line values on top of `base`
	pub(crate) fn apply(self, base:GenerationParams) -> GenerationParams
	{
		GenerationParams{
			study_count:self.studies.unwrap_or(base.study_count),
			series_count:self.series.unwrap_or(base.series_count),
			image_count:self.images.unwrap_or(base.image_count),
			modality:self.modality.unwrap_or(base.modality),
			anatomical_region:self.region.unwrap_or(base.anatomical_region),
			patient_name:self.patient_name.or(base.patient_name),
			patient_id:self.patient_id.or(base.patient_id),
			accession_number:self.accession.or(base.accession_number),
			study_description:self.description.or(base.study_description),
			width:self.width.or(base.width),
			height:self.height.or(base.height),
			bits:self.bits.or(base.bits),
			org_root:base.org_root,
		}
	}
}

#[derive(Subcommand)]
pub(crate) enum Commands {
	/// writing the default config out into the given file
	WriteConfig {
		file:PathBuf
	},
	/// generate synthetic studies and store them as files
	Create(CreateArgs),
	/// summarize the studies stored in a directory
	List {
		#[arg(long, short, value_hint = DirPath)]
		output_dir: Option<PathBuf>,
		#[arg(long, value_enum, default_value_t = ListFormat::Table)]
		format: ListFormat,
	},
	/// re-read files and check their structure
	Verify {
		/// report valid files too
		#[arg(long,default_value_t=false)]
		echo_valid:bool,
		/// file or globbing to verify
		pattern: Vec<String>,
	},
	/// list the templates of the configuration
	Templates,
}


pub(super) fn parse() -> Cli
{
	let ret=Cli::parse();

	tracing_subscriber::fmt().with_max_level(ret.log_level.0).init();

	ret
}
