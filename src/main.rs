mod cli;

use dicomsynth::{config, tools, Encoder, GenerationParams};
use dicomsynth::tools::create::{create, CreateOptions};
use dicomsynth::tools::list::{list_studies, render};
use dicomsynth::tools::verify::verify_glob;
use dicomsynth::tools::write::WriteResult;
use dicomsynth::tools::Context;

fn print_result(result:&WriteResult,json:bool)
{
	match result {
		_ if json => match serde_json::to_string(result) {
			Ok(line) => println!("{line}"),
			Err(e) => eprintln!("{e}"),
		},
		WriteResult::Written {filename,md5,..} => println!("{filename} {md5}"),
		WriteResult::Failed {filename,error} => eprintln!("{filename}: {error}"),
	}
}

#[tokio::main]
async fn main() -> tools::Result<()>
{
	let args = cli::parse();
	config::init(args.config)?;
	let config = config::get();

	match args.command {
		cli::Commands::Create(create_args) => {
			let mut params = GenerationParams{org_root:config.org_root.clone(),..Default::default()};
			if let Some(name) = &create_args.template {
				params = config.template(name)?.apply(params);
			}
			let json = create_args.json;
			let options = CreateOptions{
				output_root:create_args.output_dir.clone().unwrap_or(config.output_root.clone()),
				filename_pattern:config.filename_pattern.clone(),
				encoder:Encoder::new(config.encoder_settings()),
				seed:create_args.seed,
				parallelism:create_args.jobs,
				params:create_args.apply(params),
			};
			let summary = create(options,|result|print_result(result,json)).await?;
			eprintln!("{} studies, {} files written, {} failed",summary.studies.len(),summary.written,summary.failed);
			if summary.failed > 0 {
				return Err(tools::Error::Incomplete {failed:summary.failed,total:summary.written+summary.failed});
			}
		}
		cli::Commands::List { output_dir, format } => {
			let root = output_dir.unwrap_or(config.output_root.clone());
			let studies = list_studies(&root).await
				.context(format!("listing studies in {}",root.display()))?;
			println!("{}",render(&studies,format)?);
		}
		cli::Commands::Verify { echo_valid, pattern } => {
			let (mut checked,mut invalid) = (0,0);
			for glob in pattern {
				for result in verify_glob(glob).await? {
					checked+=1;
					if !result.is_valid() {invalid+=1}
					if echo_valid || !result.is_valid() {
						println!("{}",serde_json::to_string(&result)?);
					}
				}
			}
			eprintln!("{checked} files checked, {invalid} invalid");
			if invalid > 0 {
				return Err(tools::Error::Incomplete {failed:invalid,total:checked});
			}
		}
		cli::Commands::Templates => {
			for (name,template) in &config.templates {
				println!("{name:<20} {:<3} {} series x {} images  {} ({})",
					template.modality,template.series_count,template.image_count,template.description,template.anatomical_region);
			}
		}
		cli::Commands::WriteConfig { file } => {
			config::write(file)?
		}
	}
	Ok(())
}
