//! Class-aware object references
//!
//! Object-typed widget properties (textures, icons) accept any object whose
//! class matches the expected class, including subclasses.

use std::fmt;
use std::rc::Rc;

/// An object that can travel inside a [`Value`](crate::Value)
pub trait Object: fmt::Debug {
    /// The concrete class name
    fn class_name(&self) -> &str;

    /// Ancestor classes, nearest first
    fn inherits(&self) -> &[&'static str] {
        &[]
    }

    /// Path of the resource backing this object, if any
    fn resource_path(&self) -> Option<&str> {
        None
    }

    /// Whether this object is an instance of `class` or one of its subclasses
    fn is_class(&self, class: &str) -> bool {
        self.class_name() == class || self.inherits().iter().any(|c| *c == class)
    }
}

/// Shared, single-threaded object handle
pub type ObjectRef = Rc<dyn Object>;

/// A texture resource identified by its path
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    path: String,
}

impl Texture {
    pub const CLASS: &'static str = "Texture";

    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Create a texture wrapped as an [`ObjectRef`]
    pub fn shared(path: impl Into<String>) -> ObjectRef {
        Rc::new(Self::new(path))
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Object for Texture {
    fn class_name(&self) -> &str {
        Self::CLASS
    }

    fn resource_path(&self) -> Option<&str> {
        Some(&self.path)
    }
}

/// A texture packed into a shared atlas; accepted wherever a texture is
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasTexture {
    atlas: Texture,
}

impl AtlasTexture {
    pub fn new(atlas: Texture) -> Self {
        Self { atlas }
    }
}

impl Object for AtlasTexture {
    fn class_name(&self) -> &str {
        "AtlasTexture"
    }

    fn inherits(&self) -> &[&'static str] {
        &[Texture::CLASS]
    }

    fn resource_path(&self) -> Option<&str> {
        Some(self.atlas.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Font;

    impl Object for Font {
        fn class_name(&self) -> &str {
            "Font"
        }
    }

    #[test]
    fn test_is_class_follows_inheritance() {
        let atlas = AtlasTexture::new(Texture::new("atlas.png"));
        assert!(atlas.is_class("AtlasTexture"));
        assert!(atlas.is_class(Texture::CLASS));
        assert!(!Font.is_class(Texture::CLASS));
        assert_eq!(atlas.resource_path(), Some("atlas.png"));
        assert_eq!(Font.resource_path(), None);
    }
}
