use std::collections::BTreeMap;
use dicom::core::{Tag, VR};
use crate::dcm::violation;
use crate::tools::Result;

pub const ITEM:Tag = Tag(0xFFFE,0xE000);

/// VRs written with two reserved bytes and a 32-bit length.
pub fn has_long_length(vr:VR) -> bool
{
	matches!(vr,VR::OB|VR::OD|VR::OF|VR::OL|VR::OW|VR::SQ|VR::UC|VR::UN|VR::UR|VR::UT)
}

/// Byte used to bring odd values to even length.
pub fn padding_for(vr:VR) -> u8
{
	match vr {
		VR::UI|VR::OB|VR::UN => 0,
		_ => b' ',
	}
}

/// Maximum value length in bytes, `None` for VRs without a practical limit.
pub fn max_len(vr:VR) -> Option<usize>
{
	match vr {
		VR::DA => Some(8),
		VR::IS => Some(12),
		VR::AE|VR::CS|VR::SH|VR::DS|VR::TM => Some(16),
		VR::LO|VR::PN|VR::UI => Some(64),
		VR::ST => Some(1024),
		VR::LT => Some(10240),
		_ => None,
	}
}

/// Header size in bytes for a VR in explicit VR little endian.
pub fn header_len(vr:VR) -> usize
{
	if has_long_length(vr) {12} else {8}
}

#[derive(Debug,Clone,PartialEq)]
pub enum Value {
	/// text, multiple values are joined by backslashes
	Str(String),
	U16(Vec<u16>),
	U32(Vec<u32>),
	/// raw bytes (OB/OW/UN), OW data must already be little endian
	Bytes(Vec<u8>),
	Items(Vec<DataSet>),
}

#[derive(Debug,Clone,PartialEq)]
pub struct Element {
	pub tag:Tag,
	pub vr:VR,
	pub value:Value,
}

impl Element {
	pub fn new(tag:Tag,vr:VR,value:Value) -> Self {Element{tag,vr,value}}

	pub fn str<T>(tag:Tag,vr:VR,value:T) -> Self where String:From<T>
	{
		Element::new(tag,vr,Value::Str(value.into()))
	}

	/// value bytes including the padding byte for odd lengths
	pub fn value_bytes(&self) -> Result<Vec<u8>>
	{
		let mut bytes = match &self.value {
			Value::Str(s) => s.as_bytes().to_vec(),
			Value::U16(v) => v.iter().flat_map(|n|n.to_le_bytes()).collect(),
			Value::U32(v) => v.iter().flat_map(|n|n.to_le_bytes()).collect(),
			Value::Bytes(b) => b.clone(),
			Value::Items(items) => {
				let mut out = Vec::new();
				for item in items {
					let body = item.to_bytes()?;
					write_tag(&mut out,ITEM);
					out.extend_from_slice(&length32(body.len(),ITEM)?.to_le_bytes());
					out.extend(body);
				}
				out
			}
		};
		if bytes.len() % 2 == 1 {
			bytes.push(padding_for(self.vr));
		}
		Ok(bytes)
	}

	pub fn write_to(&self,out:&mut Vec<u8>) -> Result<()>
	{
		let value = self.value_bytes()?;
		write_tag(out,self.tag);
		out.extend_from_slice(self.vr.to_string().as_bytes());
		if has_long_length(self.vr) {
			out.extend_from_slice(&[0,0]);
			out.extend_from_slice(&length32(value.len(),self.tag)?.to_le_bytes());
		} else {
			let len = u16::try_from(value.len()).map_err(|_|violation(format!(
				"{} bytes for {} do not fit the 16-bit length of {}",value.len(),self.tag,self.vr.to_string()
			)))?;
			out.extend_from_slice(&len.to_le_bytes());
		}
		out.extend(value);
		Ok(())
	}
}

fn write_tag(out:&mut Vec<u8>,tag:Tag)
{
	out.extend_from_slice(&tag.0.to_le_bytes());
	out.extend_from_slice(&tag.1.to_le_bytes());
}

fn length32(len:usize,tag:Tag) -> Result<u32>
{
	u32::try_from(len).map_err(|_|violation(format!("{len} bytes for {tag} exceed the 32-bit length")))
}

/// Elements keyed and iterated by tag.
#[derive(Debug,Clone,Default,PartialEq)]
pub struct DataSet(BTreeMap<Tag,Element>);

impl DataSet {
	pub fn new() -> Self {DataSet::default()}

	/// adds an element, a tag can only be added once
	pub fn insert(&mut self,element:Element) -> Result<()>
	{
		if let Some(existing) = self.0.get(&element.tag) {
			return Err(violation(format!("{} inserted twice ({} and {})",element.tag,existing.vr.to_string(),element.vr.to_string())));
		}
		self.0.insert(element.tag,element);
		Ok(())
	}
	/// read back elements are checked for order by the decoder
	pub(crate) fn insert_decoded(&mut self,element:Element)
	{
		self.0.insert(element.tag,element);
	}
	pub fn put_str<T>(&mut self,tag:Tag,vr:VR,value:T) -> Result<()> where String:From<T>
	{
		self.insert(Element::str(tag,vr,value))
	}
	pub fn put_u16(&mut self,tag:Tag,value:u16) -> Result<()>
	{
		self.insert(Element::new(tag,VR::US,Value::U16(vec![value])))
	}
	pub fn get(&self,tag:Tag) -> Option<&Element> {self.0.get(&tag)}
	/// true if all text, including text inside sequence items, is plain ASCII
	pub fn is_ascii(&self) -> bool
	{
		self.0.values().all(|e|match &e.value {
			Value::Str(s) => s.is_ascii(),
			Value::Items(items) => items.iter().all(DataSet::is_ascii),
			_ => true,
		})
	}
	pub fn len(&self) -> usize {self.0.len()}
	pub fn is_empty(&self) -> bool {self.0.is_empty()}
	pub fn iter(&self) -> impl Iterator<Item=&Element> {self.0.values()}

	pub fn write_to(&self,out:&mut Vec<u8>) -> Result<()>
	{
		for element in self.0.values() {
			element.write_to(out)?;
		}
		Ok(())
	}
	pub fn to_bytes(&self) -> Result<Vec<u8>>
	{
		let mut out = Vec::new();
		self.write_to(&mut out)?;
		Ok(out)
	}
}
