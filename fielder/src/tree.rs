//! Arena-backed syntax tree for one compilation unit.
//!
//! The host owns the [`SyntaxTree`]; every other component refers to nodes
//! through [`NodeId`] handles. Type declarations keep an ordered member list
//! that the coordinator splices synthesized fields into.

use std::fmt;

use serde::Serialize;

use crate::error::TreeError;
use crate::modifiers::Modifiers;

/// Handle to a node in a [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Declaration kind of a type node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    /// Struct with named fields. The only kind that accepts injected fields.
    Class,
    TupleStruct,
    UnitStruct,
    Enum,
    Union,
    Trait,
}

impl DeclKind {
    pub fn is_class(self) -> bool {
        matches!(self, DeclKind::Class)
    }

    pub fn describe(self) -> &'static str {
        match self {
            DeclKind::Class => "struct",
            DeclKind::TupleStruct => "tuple struct",
            DeclKind::UnitStruct => "unit struct",
            DeclKind::Enum => "enum",
            DeclKind::Union => "union",
            DeclKind::Trait => "trait",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// 1-indexed source position of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub kind: DeclKind,
    pub members: Vec<NodeId>,
}

/// A field declaration. Fields never carry an initializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    /// Type as written: the simple name for synthesized fields.
    pub ty: String,
    pub modifiers: Modifiers,
    pub synthetic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDecl {
    pub name: String,
    pub params: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Type(TypeDecl),
    Field(FieldDecl),
    Constructor(ConstructorDecl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub location: Option<Location>,
}

#[derive(Debug, Default, Clone)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent,
            location: None,
        });
        id
    }

    /// Declare a new top-level type with no members.
    pub fn add_type(&mut self, name: impl Into<String>, kind: DeclKind) -> NodeId {
        self.alloc(
            NodeKind::Type(TypeDecl {
                name: name.into(),
                kind,
                members: Vec::new(),
            }),
            None,
        )
    }

    /// Append a field at the end of `owner`'s member list.
    pub fn push_field(&mut self, owner: NodeId, field: FieldDecl) -> Result<NodeId, TreeError> {
        let end = self.members(owner)?.len();
        self.insert_member(owner, end, NodeKind::Field(field))
    }

    /// Append a constructor at the end of `owner`'s member list.
    pub fn push_constructor(&mut self, owner: NodeId, ctor: ConstructorDecl) -> Result<NodeId, TreeError> {
        let end = self.members(owner)?.len();
        self.insert_member(owner, end, NodeKind::Constructor(ctor))
    }

    /// Insert a member node at `index` in `owner`'s member list.
    ///
    /// `index` is clamped to the length of the list.
    pub fn insert_member(&mut self, owner: NodeId, index: usize, kind: NodeKind) -> Result<NodeId, TreeError> {
        self.type_decl(owner)?;
        let id = self.alloc(kind, Some(owner));
        let decl = self.type_decl_mut(owner)?;
        let index = index.min(decl.members.len());
        decl.members.insert(index, id);
        Ok(id)
    }

    pub fn set_location(&mut self, id: NodeId, location: Location) -> Result<(), TreeError> {
        let node = self.nodes.get_mut(id.index()).ok_or(TreeError::UnknownNode(id))?;
        node.location = Some(location);
        Ok(())
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn type_decl(&self, id: NodeId) -> Result<&TypeDecl, TreeError> {
        match self.get(id).map(|node| &node.kind) {
            Some(NodeKind::Type(decl)) => Ok(decl),
            Some(_) => Err(TreeError::NotAType(id)),
            None => Err(TreeError::UnknownNode(id)),
        }
    }

    fn type_decl_mut(&mut self, id: NodeId) -> Result<&mut TypeDecl, TreeError> {
        match self.nodes.get_mut(id.index()).map(|node| &mut node.kind) {
            Some(NodeKind::Type(decl)) => Ok(decl),
            Some(_) => Err(TreeError::NotAType(id)),
            None => Err(TreeError::UnknownNode(id)),
        }
    }

    pub fn field(&self, id: NodeId) -> Option<&FieldDecl> {
        match self.get(id).map(|node| &node.kind) {
            Some(NodeKind::Field(field)) => Some(field),
            _ => None,
        }
    }

    pub fn members(&self, owner: NodeId) -> Result<&[NodeId], TreeError> {
        Ok(&self.type_decl(owner)?.members)
    }

    /// Fields of `owner` in member order. Empty when `owner` is not a type.
    pub fn fields(&self, owner: NodeId) -> impl Iterator<Item = (NodeId, &FieldDecl)> {
        self.member_slice(owner).iter().filter_map(|id| self.field(*id).map(|field| (*id, field)))
    }

    pub fn constructors(&self, owner: NodeId) -> impl Iterator<Item = (NodeId, &ConstructorDecl)> {
        self.member_slice(owner).iter().filter_map(|id| match self.get(*id).map(|node| &node.kind) {
            Some(NodeKind::Constructor(ctor)) => Some((*id, ctor)),
            _ => None,
        })
    }

    fn member_slice(&self, owner: NodeId) -> &[NodeId] {
        self.members(owner).unwrap_or(&[])
    }

    pub fn types(&self) -> impl Iterator<Item = (NodeId, &TypeDecl)> {
        self.nodes.iter().enumerate().filter_map(|(index, node)| match &node.kind {
            NodeKind::Type(decl) => Some((NodeId(index as u32), decl)),
            _ => None,
        })
    }

    /// Short human label used in diagnostics, e.g. ``struct `Car` ``.
    pub fn label(&self, id: NodeId) -> String {
        match self.get(id).map(|node| &node.kind) {
            Some(NodeKind::Type(decl)) => format!("{} `{}`", decl.kind, decl.name),
            Some(NodeKind::Field(field)) => format!("field `{}`", field.name),
            Some(NodeKind::Constructor(ctor)) => format!("constructor `{}`", ctor.name),
            None => format!("{id:?}"),
        }
    }

    pub fn location(&self, id: NodeId) -> Option<Location> {
        self.get(id).and_then(|node| node.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> FieldDecl {
        FieldDecl {
            name: name.to_string(),
            ty: "String".to_string(),
            modifiers: Modifiers::PUBLIC,
            synthetic: false,
        }
    }

    #[test]
    fn test_members_keep_insertion_positions() {
        let mut tree = SyntaxTree::new();
        let car = tree.add_type("Car", DeclKind::Class);
        let a = tree.push_field(car, field("a")).unwrap();
        let b = tree.push_field(car, field("b")).unwrap();
        let front = tree.insert_member(car, 0, NodeKind::Field(field("front"))).unwrap();

        assert_eq!(tree.members(car).unwrap(), &[front, a, b]);
        assert_eq!(tree.get(front).unwrap().parent, Some(car));
    }

    #[test]
    fn test_fields_and_constructors_are_filtered() {
        let mut tree = SyntaxTree::new();
        let car = tree.add_type("Car", DeclKind::Class);
        tree.push_constructor(car, ConstructorDecl { name: "new".into(), params: 0 }).unwrap();
        tree.push_field(car, field("model")).unwrap();

        let names: Vec<_> = tree.fields(car).map(|(_, f)| f.name.as_str()).collect();
        assert_eq!(names, vec!["model"]);
        assert_eq!(tree.constructors(car).count(), 1);
    }

    #[test]
    fn test_members_on_non_type_is_an_error() {
        let mut tree = SyntaxTree::new();
        let car = tree.add_type("Car", DeclKind::Class);
        let model = tree.push_field(car, field("model")).unwrap();

        assert_eq!(tree.push_field(model, field("x")), Err(TreeError::NotAType(model)));
        assert_eq!(tree.fields(model).count(), 0);
    }

    #[test]
    fn test_labels() {
        let mut tree = SyntaxTree::new();
        let kind = tree.add_type("Kind", DeclKind::Enum);
        assert_eq!(tree.label(kind), "enum `Kind`");
    }
}
