//! Group - A rectangle of slots filled by its own children.

use std::rc::Rc;

use super::{ConstructCx, ConstructFn};
use crate::error::Result;

pub struct Group {
    id: String,
    width: u16,
    height: u16,
    pub(crate) construct: Option<ConstructFn>,
}

impl Group {
    pub fn builder(id: impl Into<String>, width: u16, height: u16) -> GroupBuilder {
        GroupBuilder {
            id: id.into(),
            width: width.max(1),
            height: height.max(1),
            construct: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }
}

pub struct GroupBuilder {
    id: String,
    width: u16,
    height: u16,
    construct: Option<ConstructFn>,
}

impl GroupBuilder {
    /// Declare children. Slots passed to `cx.child` are relative to the group.
    pub fn construct(mut self, construct: impl Fn(&ConstructCx<'_>) -> Result<()> + 'static) -> Self {
        self.construct = Some(Rc::new(construct));
        self
    }

    pub fn build(self) -> Rc<Group> {
        Rc::new(Group {
            id: self.id,
            width: self.width,
            height: self.height,
            construct: self.construct,
        })
    }
}
