use alloc::string::String;
use core::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }

    /// Returns `true` for the universal base object types (`dyn Any` and its `Send`/`Sync` flavors).
    /// Nothing meaningful can be injected through them.
    #[must_use]
    pub fn is_universal_object(&self) -> bool {
        self.id == TypeId::of::<dyn Any>() || self.id == TypeId::of::<dyn Any + Send>() || self.id == TypeId::of::<dyn Any + Send + Sync>()
    }

    /// Type name with module paths stripped, generic arguments included.
    /// `app::repo::Cached<app::repo::Users>` becomes `Cached<Users>`.
    #[must_use]
    pub fn short_name(&self) -> String {
        short_type_name(self.name)
    }
}

fn short_type_name(name: &str) -> String {
    let mut short = String::with_capacity(name.len());
    let mut segment_start = 0;

    for (index, ch) in name.char_indices() {
        if matches!(ch, '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' | '*') {
            push_last_segment(&mut short, &name[segment_start..index]);
            short.push(ch);
            segment_start = index + ch.len_utf8();
        }
    }
    push_last_segment(&mut short, &name[segment_start..]);

    short
}

#[inline]
fn push_last_segment(short: &mut String, path: &str) {
    short.push_str(path.rsplit_once("::").map_or(path, |(_, name)| name));
}
