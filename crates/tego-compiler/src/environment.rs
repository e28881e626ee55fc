//! Local variable scopes

use std::rc::Rc;
use tego_bytecode::Local;

/// An immutable mapping from names to locals
///
/// Extending an environment shares the existing bindings; the newest
/// binding of a name shadows older ones.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    head: Option<Rc<Binding>>,
    len: usize,
}

#[derive(Debug)]
struct Binding {
    name: String,
    local: Local,
    next: Option<Rc<Binding>>,
}

impl Environment {
    /// The empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// This environment plus `name` bound to `local`
    pub fn with(&self, name: impl Into<String>, local: Local) -> Self {
        Self {
            head: Some(Rc::new(Binding {
                name: name.into(),
                local,
                next: self.head.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// The local bound to `name`
    pub fn get(&self, name: &str) -> Option<Local> {
        let mut binding = self.head.as_deref();
        while let Some(b) = binding {
            if b.name == name {
                return Some(b.local);
            }
            binding = b.next.as_deref();
        }
        None
    }

    /// Number of bindings, including shadowed ones
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is bound
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }
}

impl<S: Into<String>> FromIterator<(S, Local)> for Environment {
    fn from_iter<I: IntoIterator<Item = (S, Local)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Environment::new(), |env, (name, local)| env.with(name, local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tego_bytecode::{access, ClassBuilder};
    use tego_jvm::{known, JvmMethodSignature, JvmType};

    #[test]
    fn test_lookup_and_shadowing() {
        let mut class = ClassBuilder::new(52, access::PUBLIC, "T", "java/lang/Object").unwrap();
        let signature = JvmMethodSignature::new(JvmType::Void, vec![known::object(), JvmType::Int]);
        let method = class
            .method(access::PUBLIC | access::STATIC, "m", &signature, &["a", "b"])
            .unwrap();
        let a = method.parameter(0).unwrap();
        let b = method.parameter(1).unwrap();

        let outer: Environment = vec![("x", a)].into_iter().collect();
        let inner = outer.with("x", b).with("y", a);

        assert_eq!(outer.get("x"), Some(a));
        assert_eq!(inner.get("x"), Some(b));
        assert_eq!(inner.get("y"), Some(a));
        assert_eq!(outer.get("y"), None);
        assert_eq!(inner.len(), 3);
        assert!(Environment::new().is_empty());
    }
}
