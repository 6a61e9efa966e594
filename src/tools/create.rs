use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::task::JoinSet;
use tracing::{info, warn};
use crate::dcm::{EncodedObject, Encoder, PathHint};
use crate::generate::{GenerationParams, Generator};
use crate::model::{Study, Uid};
use crate::tools::{write, Error, Result};
use crate::tools::write::WriteResult;

pub struct CreateOptions {
	pub params:GenerationParams,
	pub output_root:PathBuf,
	pub filename_pattern:String,
	pub encoder:Encoder,
	/// base seed for pixel noise, the wall clock is used if not set
	pub seed:Option<u64>,
	/// maximum number of images encoded and written at the same time
	pub parallelism:usize,
}

#[derive(Debug,Default)]
pub struct CreateSummary {
	pub studies:Vec<Uid>,
	pub written:usize,
	pub failed:usize,
	pub warnings:Vec<Error>,
}

async fn encode_and_store(study:Arc<Study>,series:usize,image:usize,encoder:Encoder,root:Arc<PathBuf>,pattern:Arc<String>) -> WriteResult
{
	let hint = {
		let series = &study.series()[series];
		PathHint::new(&study,series,&series.images()[image])
	};
	let filename = hint.to_string();
	let encoded = tokio::task::spawn_blocking(move ||{
		let series = &study.series()[series];
		let image = &series.images()[image];
		encoder.encode_object(&study.patient,&study,series,image,image.pixels())
	}).await;
	match encoded {
		Ok(Ok(bytes)) => write::store(&root,&pattern,EncodedObject{hint,bytes}).await,
		Ok(Err(error)) => WriteResult::Failed {filename,error},
		Err(error) => WriteResult::Failed {filename,error:error.into()},
	}
}

/// Generates, encodes and stores all requested studies.
///
/// Studies are generated one after another, the images of a study are encoded
/// and written in parallel. Every outcome is handed to `on_result` as it happens.
pub async fn create<F>(options:CreateOptions,mut on_result:F) -> Result<CreateSummary> where F:FnMut(&WriteResult)
{
	options.params.validate()?;
	let generator = Arc::new(Generator::from_params(&options.params)?);
	let params = Arc::new(options.params);
	let root = Arc::new(options.output_root);
	let pattern = Arc::new(options.filename_pattern);
	let parallelism = options.parallelism.max(1);
	let base_seed = options.seed.unwrap_or_else(||
		SystemTime::now().duration_since(UNIX_EPOCH).map(|d|d.as_nanos() as u64).unwrap_or_default()
	);
	info!("creating {} studies below {} (seed {base_seed})",params.study_count,root.display());

	let mut summary = CreateSummary::default();
	let mut record = |result:WriteResult, summary:&mut CreateSummary| {
		if result.is_ok() {summary.written+=1} else {summary.failed+=1}
		on_result(&result);
	};

	for index in 0..params.study_count {
		let (g,p) = (generator.clone(),params.clone());
		let seed = base_seed.wrapping_add(index as u64);
		let (study,failures) = tokio::task::spawn_blocking(move ||
			g.generate_study(&p,index,&mut StdRng::seed_from_u64(seed))
		).await??;

		for failure in failures {
			let filename = format!("{}/series_{:03}/image_{:03}.dcm",study.uid,failure.series_number,failure.instance_number);
			record(WriteResult::Failed {filename,error:failure.error},&mut summary);
		}

		let study = Arc::new(study);
		let mut tasks = JoinSet::new();
		for (s,series) in study.series().iter().enumerate() {
			for i in 0..series.images().len() {
				while tasks.len() >= parallelism {
					if let Some(done) = tasks.join_next().await {
						record(done?,&mut summary);
					}
				}
				tasks.spawn(encode_and_store(study.clone(),s,i,options.encoder.clone(),root.clone(),pattern.clone()));
			}
		}
		while let Some(done) = tasks.join_next().await {
			record(done?,&mut summary);
		}
		summary.studies.push(study.uid.clone());
	}

	summary.warnings = generator.warnings();
	for warning in &summary.warnings {
		warn!("{warning}");
	}
	Ok(summary)
}
