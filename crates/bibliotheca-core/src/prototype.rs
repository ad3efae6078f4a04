//! Copy-by-example objects with an explicit choice between shared and
//! independent nested collections.
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::error::{BibliothecaError, Result};

type Shared<T> = Rc<RefCell<T>>;

fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Something that can produce copies of itself.
pub trait Prototype {
    /// Copy whose nested collections are shared with the original.
    fn shallow_clone(&self) -> Self;

    /// Copy whose nested collections are independent of the original.
    fn deep_clone(&self) -> Self;
}

#[derive(Debug, Clone)]
pub struct Person {
    pub name: String,
    pub age: u32,
    hobbies: Shared<Vec<String>>,
    metadata: Shared<BTreeMap<String, Value>>,
}

/// Fields replaced by [`Person::clone_with`].
#[derive(Debug, Clone, Default)]
pub struct PersonOverrides {
    pub name: Option<String>,
    pub age: Option<u32>,
}

impl Person {
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            age,
            hobbies: shared(Vec::new()),
            metadata: shared(BTreeMap::new()),
        }
    }

    pub fn with_hobbies(mut self, hobbies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.hobbies = shared(hobbies.into_iter().map(Into::into).collect());
        self
    }

    pub fn add_hobby(&self, hobby: impl Into<String>) {
        self.hobbies.borrow_mut().push(hobby.into());
    }

    pub fn hobbies(&self) -> Vec<String> {
        self.hobbies.borrow().clone()
    }

    pub fn update_metadata(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.borrow_mut().insert(key.into(), value.into());
    }

    pub fn metadata(&self) -> BTreeMap<String, Value> {
        self.metadata.borrow().clone()
    }

    /// Whether `other` shares this person's nested collections.
    pub fn shares_collections_with(&self, other: &Person) -> bool {
        Rc::ptr_eq(&self.hobbies, &other.hobbies) && Rc::ptr_eq(&self.metadata, &other.metadata)
    }

    /// Independent copy with selected fields replaced.
    pub fn clone_with(&self, overrides: PersonOverrides) -> Self {
        let mut cloned = self.deep_clone();
        if let Some(name) = overrides.name {
            cloned.name = name;
        }
        if let Some(age) = overrides.age {
            cloned.age = age;
        }
        cloned
    }

    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "age": self.age,
            "hobbies": self.hobbies(),
            "metadata": self.metadata(),
        })
    }
}

impl Prototype for Person {
    fn shallow_clone(&self) -> Self {
        self.clone()
    }

    fn deep_clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            age: self.age,
            hobbies: shared(self.hobbies()),
            metadata: shared(self.metadata()),
        }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Person(name='{}', age={}, hobbies={:?})",
            self.name,
            self.age,
            self.hobbies.borrow()
        )
    }
}

#[derive(Debug, Clone)]
pub struct Employee {
    pub person: Person,
    pub position: String,
    pub salary: f64,
    skills: Shared<Vec<String>>,
}

impl Employee {
    pub fn new(person: Person, position: impl Into<String>, salary: f64) -> Self {
        Self {
            person,
            position: position.into(),
            salary,
            skills: shared(Vec::new()),
        }
    }

    pub fn add_skill(&self, skill: impl Into<String>) {
        self.skills.borrow_mut().push(skill.into());
    }

    pub fn skills(&self) -> Vec<String> {
        self.skills.borrow().clone()
    }
}

impl Prototype for Employee {
    fn shallow_clone(&self) -> Self {
        self.clone()
    }

    fn deep_clone(&self) -> Self {
        Self {
            person: self.person.deep_clone(),
            position: self.position.clone(),
            salary: self.salary,
            skills: shared(self.skills()),
        }
    }
}

/// Named prototypes handed out as copies.
#[derive(Debug)]
pub struct PrototypeRegistry<P> {
    prototypes: BTreeMap<String, P>,
}

impl<P> Default for PrototypeRegistry<P> {
    fn default() -> Self {
        Self {
            prototypes: BTreeMap::new(),
        }
    }
}

impl<P: Prototype> PrototypeRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: impl Into<String>, prototype: P) {
        self.prototypes.insert(key.into(), prototype);
    }

    pub fn unregister(&mut self, key: &str) -> Option<P> {
        self.prototypes.remove(key)
    }

    pub fn get(&self, key: &str) -> Result<P> {
        self.lookup(key).map(Prototype::shallow_clone)
    }

    pub fn get_deep(&self, key: &str) -> Result<P> {
        self.lookup(key).map(Prototype::deep_clone)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.prototypes.keys().map(String::as_str)
    }

    fn lookup(&self, key: &str) -> Result<&P> {
        self.prototypes
            .get(key)
            .ok_or_else(|| BibliothecaError::PrototypeNotFound(key.to_string()))
    }
}
