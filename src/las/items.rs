//! Description of the items making up a point record and the version
//! of the compression used for each of them.

use crate::errors::LazError;
use crate::las::point10::Point10;
use crate::las::rgb::RGB;

/// The compression version given to items by the [`LazItemRecordBuilder`]
pub const DEFAULT_ITEM_VERSION: u16 = 2;

/// The different type of fields that can make up a point record
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LazItemType {
    /// Point10 is the Point format id 0 of LAS for versions <= 1.3
    Point10,
    /// RGB for LAS versions <= 1.3
    RGB12,
}

impl LazItemType {
    pub fn size(&self) -> u16 {
        match self {
            LazItemType::Point10 => Point10::SIZE as u16,
            LazItemType::RGB12 => RGB::SIZE as u16,
        }
    }

    pub fn from_code(code: u16) -> crate::Result<Self> {
        match code {
            6 => Ok(LazItemType::Point10),
            8 => Ok(LazItemType::RGB12),
            _ => Err(LazError::UnknownLazItem(code)),
        }
    }
}

impl From<LazItemType> for u16 {
    fn from(t: LazItemType) -> Self {
        match t {
            LazItemType::Point10 => 6,
            LazItemType::RGB12 => 8,
        }
    }
}

/// One field of a record: what it is, how many bytes it takes
/// and which compression version encodes it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LazItem {
    pub(crate) item_type: LazItemType,
    pub(crate) size: u16,
    pub(crate) version: u16,
}

impl LazItem {
    pub fn new(item_type: LazItemType, version: u16) -> Self {
        Self {
            item_type,
            size: item_type.size(),
            version,
        }
    }

    pub fn item_type(&self) -> LazItemType {
        self.item_type
    }

    pub fn size(&self) -> u16 {
        self.size
    }

    pub fn version(&self) -> u16 {
        self.version
    }
}

#[derive(Debug, Default, Clone)]
pub struct LazItemRecordBuilder {
    items: Vec<LazItemType>,
}

impl LazItemRecordBuilder {
    pub fn new() -> Self {
        Self { items: vec![] }
    }

    /// Items of a point format 0 record, optionally followed by colors.
    pub fn default_for_point10(with_rgb: bool) -> Vec<LazItem> {
        let mut builder = Self::new();
        builder.add_item(LazItemType::Point10);
        if with_rgb {
            builder.add_item(LazItemType::RGB12);
        }
        builder.build()
    }

    pub fn add_item(&mut self, item_type: LazItemType) -> &mut Self {
        self.items.push(item_type);
        self
    }

    pub fn build(&self) -> Vec<LazItem> {
        self.items
            .iter()
            .map(|&item_type| LazItem::new(item_type, DEFAULT_ITEM_VERSION))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_uses_version_2() {
        let items = LazItemRecordBuilder::new()
            .add_item(LazItemType::Point10)
            .add_item(LazItemType::RGB12)
            .build();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|item| item.version() == 2));
        assert_eq!(items[0].size(), 20);
        assert_eq!(items[1].size(), 6);
        assert_eq!(items, LazItemRecordBuilder::default_for_point10(true));
    }

    #[test]
    fn test_type_codes() {
        for &item_type in &[LazItemType::Point10, LazItemType::RGB12] {
            assert_eq!(LazItemType::from_code(item_type.into()).unwrap(), item_type);
        }
        assert_eq!(u16::from(LazItemType::Point10), 6);
        assert_eq!(u16::from(LazItemType::RGB12), 8);
    }

    #[test]
    fn test_unknown_type_code() {
        // GpsTime
        match LazItemType::from_code(7) {
            Err(LazError::UnknownLazItem(7)) => {}
            other => panic!("expected an unknown item error, got {:?}", other),
        }
    }
}
