use std::path::PathBuf;
use thiserror::Error;

#[derive(Error,Debug)]
pub enum Error
{
	#[error("unsupported modality '{modality}'")]
	UnsupportedModality{modality:String},
	#[error("pixel buffer holds {found} bytes but the declared geometry needs {expected}")]
	GeometryMismatch{expected:usize,found:usize},
	#[error("secure randomness unavailable, identifiers fell back to timestamps ({reason})")]
	InsecureRandomFallback{reason:String},
	#[error("encoding invariant violated: {message}")]
	EncodingInvariantViolation{message:String},

	#[error("malformed object at byte {offset}: {message}")]
	Decode{offset:usize,message:String},
	#[error("invalid organization root '{root}' ({reason})")]
	InvalidOrgRoot{root:String,reason:String},
	#[error("invalid value for {name}: {message}")]
	InvalidParameter{name:String,message:String},
	#[error("template '{name}' not found (available {available:?})")]
	TemplateNotFound{name:String,available:Vec<String>},
	#[error("{failed} of {total} items failed")]
	Incomplete{failed:usize,total:usize},

	#[error("io error {0}")]
	IoError(#[from] std::io::Error),

	#[error("config error {0}")]
	ConfigError(#[from] config::ConfigError),

	#[error("Json error {0}")]
	JsonError(#[from] serde_json::Error),

	#[error("Error in background task {0}")]
	JoinError(#[from] tokio::task::JoinError),

	#[error("Failed to format path {0}")]
	FormatError(#[from] strfmt::FmtError),

	#[error("Invalid globbing pattern {pattern} ({err})")]
	GlobbingError{pattern:String,err:glob::PatternError},

	#[error("{source} when {context}")]
	Context{
		source:Box<Error>,
		context:String
	},
	#[error("Invalid filename {name:?}")]
	InvalidFilename{name:PathBuf},
	#[error("No data found")]
	NotFound,
}

impl Error {
	pub(crate) fn context<T>(self, context:T) -> Error where String:From<T>
	{
		Error::Context {source:Box::new(self),context:context.into()}
	}
	pub(crate) fn context_from<E,T>(error:E,context:T) -> Error where String:From<T>, Error:From<E>
	{
		Error::from(error).context(context)
	}
	/// iterate through this error and all errors it was caused by
	pub fn sources(&self) -> Source
	{
		Source{current:Some(self)}
	}
	/// the innermost error, skipping all layers of context
	pub fn root_cause(&self) -> &Error
	{
		match self {
			Error::Context {source,..} => source.root_cause(),
			_ => self
		}
	}
}

pub struct Source<'a> {
	pub current: Option<&'a (dyn std::error::Error + 'static)>,
}

impl<'a> Iterator for Source<'a> {
	type Item = &'a (dyn std::error::Error + 'static);

	fn next(&mut self) -> Option<Self::Item> {
		let current = self.current;
		self.current = self.current.and_then(std::error::Error::source);
		current
	}
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait Context{
	type V;
	fn context<C>(self,context:C) -> Result<Self::V> where String:From<C>;
}

impl<T,E> Context for std::result::Result<T,E> where Error:From<E>
{
	type V=T;

	fn context<C>(self, context: C) -> Result<Self::V> where String: From<C> {
		self.map_err(|e|Error::context_from(e,context))
	}
}
