use dicom::core::{Tag, VR};
use dicom::dictionary_std::tags;
use crate::dcm::{has_long_length, DataSet, Element, Value, EXPLICIT_VR_LITTLE_ENDIAN, ITEM, MAGIC, PREAMBLE_LEN, UTF8};
use crate::tools::{Error, Result};

const META_START:usize = PREAMBLE_LEN + 4;

struct Reader<'a> {
	bytes:&'a [u8],
	/// absolute offset of `bytes[0]` in the stream
	base:usize,
	pos:usize,
	/// text is UTF-8 instead of Latin-1
	utf8:bool,
}

impl<'a> Reader<'a> {
	fn new(bytes:&'a [u8],base:usize,utf8:bool) -> Self {Reader{bytes,base,pos:0,utf8}}
	fn offset(&self) -> usize {self.base+self.pos}
	fn at_end(&self) -> bool {self.pos >= self.bytes.len()}
	fn error<T>(&self,message:impl Into<String>) -> Result<T>
	{
		Err(Error::Decode {offset:self.offset(),message:message.into()})
	}
	fn take(&mut self,n:usize) -> Result<&'a [u8]>
	{
		if self.bytes.len() - self.pos < n {
			return self.error(format!("needed {n} bytes, only {} left",self.bytes.len()-self.pos));
		}
		let ret = &self.bytes[self.pos..self.pos+n];
		self.pos += n;
		Ok(ret)
	}
	fn u16(&mut self) -> Result<u16>
	{
		let b = self.take(2)?;
		Ok(u16::from_le_bytes([b[0],b[1]]))
	}
	fn u32(&mut self) -> Result<u32>
	{
		let b = self.take(4)?;
		Ok(u32::from_le_bytes([b[0],b[1],b[2],b[3]]))
	}
	fn tag(&mut self) -> Result<Tag>
	{
		Ok(Tag(self.u16()?,self.u16()?))
	}
	fn peek_group(&self) -> Option<u16>
	{
		self.bytes.get(self.pos..self.pos+2).map(|b|u16::from_le_bytes([b[0],b[1]]))
	}

	fn element(&mut self) -> Result<Element>
	{
		let tag = self.tag()?;
		let vr_bytes = self.take(2)?;
		let Some(vr) = VR::from_binary([vr_bytes[0],vr_bytes[1]]) else {
			return self.error(format!("unknown VR {:?} for {tag}",String::from_utf8_lossy(vr_bytes)));
		};
		let len = if has_long_length(vr) {
			self.take(2)?;
			self.u32()?
		} else {
			self.u16()? as u32
		};
		if len == u32::MAX {
			return self.error(format!("undefined length for {tag} is not supported"));
		}
		let value_offset = self.offset();
		let raw = self.take(len as usize)?;
		let value = match vr {
			VR::SQ => Value::Items(items(Reader::new(raw,value_offset,self.utf8))?),
			VR::US => {
				if raw.len() % 2 != 0 {
					return self.error(format!("odd length {} for US {tag}",raw.len()));
				}
				Value::U16(raw.chunks_exact(2).map(|c|u16::from_le_bytes([c[0],c[1]])).collect())
			}
			VR::UL => {
				if raw.len() % 4 != 0 {
					return self.error(format!("length {} for UL {tag} is not a multiple of 4",raw.len()));
				}
				Value::U32(raw.chunks_exact(4).map(|c|u32::from_le_bytes([c[0],c[1],c[2],c[3]])).collect())
			}
			VR::OB|VR::OW|VR::OF|VR::OD|VR::OL|VR::UN => Value::Bytes(raw.to_vec()),
			_ => {
				let text = if self.utf8 {
					match std::str::from_utf8(raw) {
						Ok(text) => text.to_string(),
						Err(e) => return self.error(format!("{tag} is not valid UTF-8 ({e})")),
					}
				} else {
					raw.iter().map(|&b|char::from(b)).collect()
				};
				Value::Str(text.trim_end_matches(['\0',' ']).to_string())
			}
		};
		Ok(Element{tag,vr,value})
	}
}

fn items(mut reader:Reader) -> Result<Vec<DataSet>>
{
	let mut ret = Vec::new();
	while !reader.at_end() {
		let tag = reader.tag()?;
		if tag != ITEM {
			return reader.error(format!("expected an item, found {tag}"));
		}
		let len = reader.u32()?;
		if len == u32::MAX {
			return reader.error("undefined item length is not supported");
		}
		let body_offset = reader.offset();
		let mut body = Reader::new(reader.take(len as usize)?,body_offset,reader.utf8);
		let mut item = DataSet::new();
		let mut last:Option<Tag> = None;
		while !body.at_end() {
			let start = body.offset();
			let element = body.element()?;
			if last.is_some_and(|last|last >= element.tag) {
				return Err(Error::Decode {offset:start,message:format!("{} out of order inside item",element.tag)});
			}
			last = Some(element.tag);
			item.insert_decoded(element);
		}
		ret.push(item);
	}
	Ok(ret)
}

/// An object read back from its Part 10 bytes.
#[derive(Debug)]
pub struct DecodedObject {
	/// value of the group length element
	pub declared_meta_length:u32,
	/// bytes actually occupied by the meta elements after the group length
	pub measured_meta_length:usize,
	meta:Vec<(usize,Element)>,
	elements:Vec<(usize,Element)>,
}

/// Parses a stream in the layout the encoder produces.
pub fn decode(bytes:&[u8]) -> Result<DecodedObject>
{
	if bytes.len() < META_START {
		return Err(Error::Decode {offset:bytes.len(),message:"too short for preamble and magic".into()});
	}
	if &bytes[PREAMBLE_LEN..META_START] != MAGIC {
		return Err(Error::Decode {offset:PREAMBLE_LEN,message:"missing DICM magic".into()});
	}
	let mut reader = Reader::new(&bytes[META_START..],META_START,false);
	let group_length = reader.element()?;
	let declared_meta_length = match group_length {
		Element{tag:tags::FILE_META_INFORMATION_GROUP_LENGTH,value:Value::U32(v),..} if v.len() == 1 => v[0],
		other => return Err(Error::Decode {offset:META_START,message:format!("expected the meta group length, found {}",other.tag)}),
	};

	let meta_start = reader.offset();
	let mut meta = Vec::new();
	while reader.peek_group() == Some(0x0002) {
		let offset = reader.offset();
		meta.push((offset,reader.element()?));
	}
	let measured_meta_length = reader.offset() - meta_start;

	let syntax = meta.iter()
		.find(|(_,e)|e.tag == tags::TRANSFER_SYNTAX_UID)
		.and_then(|(_,e)|match &e.value {Value::Str(s) => Some(s.as_str()),_ => None});
	if syntax != Some(EXPLICIT_VR_LITTLE_ENDIAN) {
		return Err(Error::Decode {offset:meta_start,message:format!("unsupported transfer syntax {syntax:?}")});
	}

	let mut elements = Vec::new();
	while !reader.at_end() {
		let offset = reader.offset();
		let element = reader.element()?;
		if element.tag == tags::SPECIFIC_CHARACTER_SET {
			reader.utf8 = matches!(&element.value,Value::Str(s) if s == UTF8);
		}
		elements.push((offset,element));
	}
	Ok(DecodedObject{declared_meta_length,measured_meta_length,meta,elements})
}

fn check_order(elements:&[(usize,Element)],what:&str) -> Result<()>
{
	for pair in elements.windows(2) {
		let ((_,a),(offset,b)) = (&pair[0],&pair[1]);
		if a.tag >= b.tag {
			return Err(Error::Decode {offset:*offset,message:format!("{} follows {} in {what}",b.tag,a.tag)});
		}
	}
	Ok(())
}

impl DecodedObject {
	pub fn meta(&self) -> impl Iterator<Item=&Element> {self.meta.iter().map(|(_,e)|e)}
	pub fn elements(&self) -> impl Iterator<Item=&Element> {self.elements.iter().map(|(_,e)|e)}

	pub fn element(&self,tag:Tag) -> Option<&Element>
	{
		let list = if tag.0 == 0x0002 {&self.meta} else {&self.elements};
		list.iter().map(|(_,e)|e).find(|e|e.tag == tag)
	}
	pub fn string(&self,tag:Tag) -> Option<&str>
	{
		match &self.element(tag)?.value {
			Value::Str(s) => Some(s.as_str()),
			_ => None
		}
	}
	pub fn uint16(&self,tag:Tag) -> Option<u16>
	{
		match &self.element(tag)?.value {
			Value::U16(v) => v.first().copied(),
			_ => None
		}
	}
	pub fn bytes(&self,tag:Tag) -> Option<&[u8]>
	{
		match &self.element(tag)?.value {
			Value::Bytes(b) => Some(b.as_slice()),
			_ => None
		}
	}
	pub fn items(&self,tag:Tag) -> Option<&[DataSet]>
	{
		match &self.element(tag)?.value {
			Value::Items(items) => Some(items.as_slice()),
			_ => None
		}
	}

	/// number of bytes the declared rows, columns and bit depth require
	pub fn frame_len(&self) -> Option<usize>
	{
		let rows = self.uint16(tags::ROWS)? as usize;
		let columns = self.uint16(tags::COLUMNS)? as usize;
		let samples = self.uint16(tags::SAMPLES_PER_PIXEL).unwrap_or(1) as usize;
		let bits = self.uint16(tags::BITS_ALLOCATED)? as usize;
		Some(rows*columns*samples*bits.div_ceil(8))
	}

	/// pixel data without the padding byte
	pub fn pixel_data(&self) -> Option<&[u8]>
	{
		let data = self.bytes(tags::PIXEL_DATA)?;
		let len = self.frame_len().unwrap_or(data.len()).min(data.len());
		Some(&data[..len])
	}

	/// Checks meta length, tag order, sop identity and pixel geometry.
	pub fn check_invariants(&self) -> Result<()>
	{
		if self.declared_meta_length as usize != self.measured_meta_length {
			return Err(Error::Decode {offset:META_START,message:format!(
				"meta group length is {} but the meta elements take {} bytes",
				self.declared_meta_length,self.measured_meta_length
			)});
		}
		check_order(&self.meta,"meta information")?;
		check_order(&self.elements,"data set")?;

		for (meta_tag,tag) in [
			(tags::MEDIA_STORAGE_SOP_CLASS_UID,tags::SOP_CLASS_UID),
			(tags::MEDIA_STORAGE_SOP_INSTANCE_UID,tags::SOP_INSTANCE_UID)
		] {
			if self.string(meta_tag).is_none() || self.string(meta_tag) != self.string(tag) {
				return Err(Error::Decode {offset:META_START,message:format!(
					"{meta_tag} {:?} does not match {tag} {:?}",self.string(meta_tag),self.string(tag)
				)});
			}
		}

		if let Some(data) = self.bytes(tags::PIXEL_DATA) {
			let Some(expected) = self.frame_len() else {
				return Err(Error::Decode {offset:0,message:"pixel data without rows, columns and bits allocated".into()});
			};
			if data.len() != expected + expected % 2 {
				return Err(Error::GeometryMismatch {expected,found:data.len()});
			}
		}
		Ok(())
	}
}
