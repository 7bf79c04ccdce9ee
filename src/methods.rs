/// One or many HTTP methods a route responds to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Methods {
    Single(String),
    List(Vec<String>),
}

impl Methods {
    pub fn is_empty(&self) -> bool {
        match self {
            Methods::Single(_) => false,
            Methods::List(methods) => methods.is_empty(),
        }
    }

    /// Iterates over the methods in the order given, skipping repeats.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let methods = match self {
            Methods::Single(method) => std::slice::from_ref(method),
            Methods::List(methods) => methods.as_slice(),
        };

        methods
            .iter()
            .enumerate()
            .filter(move |&(idx, method)| !methods[..idx].contains(method))
            .map(|(_, method)| method.as_str())
    }
}

/// Helper trait for types that can be converted to one or more HTTP methods.
pub trait IntoMethods {
    fn methods(&self) -> Methods;
}

impl IntoMethods for String {
    fn methods(&self) -> Methods {
        Methods::Single(self.clone())
    }
}

impl IntoMethods for &String {
    fn methods(&self) -> Methods {
        (*self).methods()
    }
}

impl IntoMethods for str {
    fn methods(&self) -> Methods {
        Methods::Single(self.to_owned())
    }
}

impl IntoMethods for &str {
    fn methods(&self) -> Methods {
        (*self).methods()
    }
}

impl IntoMethods for Methods {
    fn methods(&self) -> Methods {
        self.clone()
    }
}

impl<T: AsRef<str>> IntoMethods for Vec<T> {
    fn methods(&self) -> Methods {
        Methods::List(self.iter().map(|v| v.as_ref().to_owned()).collect())
    }
}

impl<T: AsRef<str>> IntoMethods for &[T] {
    fn methods(&self) -> Methods {
        Methods::List(self.iter().map(|v| v.as_ref().to_owned()).collect())
    }
}

impl<T: AsRef<str>, const N: usize> IntoMethods for [T; N] {
    fn methods(&self) -> Methods {
        Methods::List(self.iter().map(|v| v.as_ref().to_owned()).collect())
    }
}

#[cfg(feature = "http")]
impl IntoMethods for http::Method {
    fn methods(&self) -> Methods {
        Methods::Single(self.as_str().to_owned())
    }
}

#[cfg(feature = "http")]
impl IntoMethods for &http::Method {
    fn methods(&self) -> Methods {
        (*self).methods()
    }
}
