//! A catalog of contracts and the types that conform to them.
//!
//! Every kind of requirement has a contract here: properties (read-only and
//! read-write), instance and type-level methods, mutating methods,
//! initializers, optional members, inheritance, reference-only contracts and
//! composition. [`registry`] declares all of the conformances.
//!
//! A conformance that leaves out a required member does not compile:
//!
//! ```compile_fail
//! use conformant::catalog::HasValue;
//!
//! struct Empty;
//! impl HasValue for Empty {}
//! ```
//!
//! Neither does one that satisfies a read-write property with a read-only
//! member, since the setter is missing:
//!
//! ```compile_fail
//! use conformant::catalog::Adjustable;
//!
//! struct Fixed { level: i64 }
//! impl Adjustable for Fixed {
//!     fn level(&self) -> i64 { self.level }
//!     fn ceiling(&self) -> i64 { 10 }
//! }
//! ```
//!
//! A value type cannot conform to a contract restricted to reference types:
//!
//! ```compile_fail
//! use conformant::catalog::Location;
//!
//! struct Spot { latitude: f64, longitude: f64 }
//! impl Location for Spot {
//!     fn latitude(&self) -> f64 { self.latitude }
//!     fn longitude(&self) -> f64 { self.longitude }
//! }
//! ```

use std::f64::consts::PI;
use std::fmt;

use crate::conformance::{Described, Semantics, TypeDescriptor};
use crate::contract::{Access, Contract, ContractDescriptor, Member};
use crate::error::Result;
use crate::game::{DiceGame, DiceGameDelegate, DiceGameTracker, SnakesAndLadders};
use crate::object::{Handle, Object, Shared};
use crate::registry::ConformanceRegistry;
use crate::{conforms, contract};

// ------------- Property requirements -------------
pub trait FullyNamed {
    fn full_name(&self) -> String;
}
contract!(FullyNamed => ContractDescriptor::new("FullyNamed")
    .require(Member::property("full_name", "String", Access::Get)));

pub trait Adjustable {
    fn level(&self) -> i64;
    fn set_level(&mut self, level: i64);
    fn ceiling(&self) -> i64;
}
contract!(Adjustable => ContractDescriptor::new("Adjustable")
    .require(Member::property("level", "i64", Access::GetSet))
    .require(Member::property("ceiling", "i64", Access::Get)));

pub trait Kinded {
    fn kind() -> &'static str
    where
        Self: Sized;
}
contract!(Kinded => ContractDescriptor::new("Kinded")
    .require(Member::type_member("kind", "fn() -> &'static str")));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    full_name: String,
}
impl Person {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
        }
    }
    pub fn set_full_name(&mut self, full_name: impl Into<String>) {
        self.full_name = full_name.into();
    }
}
impl FullyNamed for Person {
    fn full_name(&self) -> String {
        self.full_name.clone()
    }
}
impl Kinded for Person {
    fn kind() -> &'static str {
        "person"
    }
}
impl Described for Person {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("Person", Semantics::Value)
            .provide(Member::property("full_name", "String", Access::GetSet))
            .provide(Member::type_member("kind", "fn() -> &'static str"))
    }
}
conforms!(Person => FullyNamed, Kinded);

// the full name is computed, so it can only be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Starship {
    prefix: Option<String>,
    name: String,
}
impl Starship {
    pub fn new(name: impl Into<String>, prefix: Option<&str>) -> Self {
        Self {
            prefix: prefix.map(String::from),
            name: name.into(),
        }
    }
}
impl FullyNamed for Starship {
    fn full_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{} {}", prefix, self.name),
            None => self.name.clone(),
        }
    }
}
impl Described for Starship {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("Starship", Semantics::Value)
            .provide(Member::property("full_name", "String", Access::Get))
            .provide(Member::property("name", "String", Access::GetSet))
    }
}
conforms!(Starship => FullyNamed);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dial {
    level: i64,
    ceiling: i64,
}
impl Dial {
    pub fn new(ceiling: i64) -> Self {
        Self { level: 0, ceiling }
    }
    // settable although the contract only asks for reading
    pub fn set_ceiling(&mut self, ceiling: i64) {
        self.ceiling = ceiling;
        self.level = self.level.min(ceiling);
    }
}
impl Adjustable for Dial {
    fn level(&self) -> i64 {
        self.level
    }
    /// Levels above the ceiling are cut down to it.
    fn set_level(&mut self, level: i64) {
        self.level = level.min(self.ceiling);
    }
    fn ceiling(&self) -> i64 {
        self.ceiling
    }
}
impl Kinded for Dial {
    fn kind() -> &'static str {
        "dial"
    }
}
impl Described for Dial {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("Dial", Semantics::Value)
            .provide(Member::property("level", "i64", Access::GetSet))
            .provide(Member::property("ceiling", "i64", Access::GetSet))
            .provide(Member::type_member("kind", "fn() -> &'static str"))
    }
}
conforms!(Dial => Adjustable, Kinded);

// ------------- Method requirements -------------
pub trait RandomNumberGenerator {
    /// A number in `[0, 1)`.
    fn random(&mut self) -> f64;
    fn random_bool(&mut self) -> bool {
        self.random() > 0.5
    }
}
contract!(RandomNumberGenerator => ContractDescriptor::new("RandomNumberGenerator")
    .require(Member::mutating_method("random", &[], "f64")));

#[derive(Debug, Clone, PartialEq)]
pub struct LinearCongruentialGenerator {
    last_random: f64,
}
impl LinearCongruentialGenerator {
    const MODULUS: f64 = 139968.0;
    const MULTIPLIER: f64 = 3877.0;
    const INCREMENT: f64 = 29573.0;

    pub fn new() -> Self {
        Self::with_seed(42.0)
    }
    pub fn with_seed(seed: f64) -> Self {
        Self {
            last_random: seed.rem_euclid(Self::MODULUS),
        }
    }
}
impl Default for LinearCongruentialGenerator {
    fn default() -> Self {
        Self::new()
    }
}
impl RandomNumberGenerator for LinearCongruentialGenerator {
    fn random(&mut self) -> f64 {
        self.last_random =
            (self.last_random * Self::MULTIPLIER + Self::INCREMENT) % Self::MODULUS;
        self.last_random / Self::MODULUS
    }
}
conforms!(LinearCongruentialGenerator => RandomNumberGenerator);

// ------------- Mutating method requirements -------------
pub trait Togglable {
    fn toggle(&mut self);
}
contract!(Togglable => ContractDescriptor::new("Togglable")
    .require(Member::mutating_method("toggle", &[], "()")));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnOffSwitch {
    Off,
    On,
}
impl Togglable for OnOffSwitch {
    fn toggle(&mut self) {
        *self = match self {
            OnOffSwitch::Off => OnOffSwitch::On,
            OnOffSwitch::On => OnOffSwitch::Off,
        };
    }
}
impl Described for OnOffSwitch {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("OnOffSwitch", Semantics::Value)
            .provide(Member::mutating_method("toggle", &[], "()"))
    }
}
conforms!(OnOffSwitch => Togglable);

/// A reference type: clones share one bulb.
#[derive(Debug, Clone)]
pub struct Lamp {
    lit: Shared<bool>,
}
impl Lamp {
    pub fn new() -> Self {
        Self {
            lit: Shared::new(false),
        }
    }
    pub fn is_lit(&self) -> bool {
        *self.lit.read()
    }
}
impl Default for Lamp {
    fn default() -> Self {
        Self::new()
    }
}
impl Togglable for Lamp {
    fn toggle(&mut self) {
        let mut lit = self.lit.write();
        *lit = !*lit;
    }
}
impl Object for Lamp {
    fn handle(&self) -> &dyn Handle {
        &self.lit
    }
}
impl Described for Lamp {
    fn describe() -> TypeDescriptor {
        // the receiver is only read, the bulb behind it changes
        TypeDescriptor::new("Lamp", Semantics::Reference)
            .provide(Member::method("toggle", &[], "()"))
            .provide(Member::method("handle", &[], "&dyn Handle"))
    }
}
conforms!(Lamp => Togglable, Object);

// ------------- Initializer requirements -------------
pub trait Initializable {
    fn init(balance: i64) -> Self
    where
        Self: Sized;
}
contract!(Initializable => ContractDescriptor::new("Initializable")
    .require(Member::initializer("init", &["i64"])));

pub fn make<T: Initializable>(balance: i64) -> T {
    T::init(balance)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    balance: i64,
}
impl Account {
    pub fn balance(&self) -> i64 {
        self.balance
    }
}
impl Initializable for Account {
    fn init(balance: i64) -> Self {
        Self { balance }
    }
}
conforms!(Account => Initializable);

/// Builds on an [`Account`] and has to provide the same initializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavingsAccount {
    account: Account,
    interest_rate: u32,
}
impl SavingsAccount {
    pub const DEFAULT_RATE: u32 = 2;

    pub fn account(&self) -> &Account {
        &self.account
    }
    pub fn interest_rate(&self) -> u32 {
        self.interest_rate
    }
}
impl Initializable for SavingsAccount {
    fn init(balance: i64) -> Self {
        Self {
            account: Account::init(balance),
            interest_rate: Self::DEFAULT_RATE,
        }
    }
}
conforms!(SavingsAccount => Initializable);

// ------------- Contracts as types -------------
pub struct Dice {
    sides: usize,
    generator: Box<dyn RandomNumberGenerator + Send + Sync>,
}
impl Dice {
    pub fn new<G>(sides: usize, generator: G) -> Self
    where
        G: RandomNumberGenerator + Send + Sync + 'static,
    {
        Self {
            sides,
            generator: Box::new(generator),
        }
    }
    pub fn sides(&self) -> usize {
        self.sides
    }
    pub fn roll(&mut self) -> usize {
        (self.generator.random() * self.sides as f64) as usize + 1
    }
}
impl fmt::Debug for Dice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Dice").field("sides", &self.sides).finish()
    }
}

// ------------- Inheritance -------------
pub trait TextRepresentable {
    fn text_description(&self) -> String;
}
contract!(TextRepresentable => ContractDescriptor::new("TextRepresentable")
    .require(Member::property("text_description", "String", Access::Get)));

pub trait PrettyTextRepresentable: TextRepresentable {
    fn pretty_text_description(&self) -> String {
        self.text_description()
    }
}
contract!(PrettyTextRepresentable => ContractDescriptor::new("PrettyTextRepresentable")
    .inherits(<dyn TextRepresentable as Contract>::descriptor())
    .require(Member::property("pretty_text_description", "String", Access::Get)));

impl TextRepresentable for Dice {
    fn text_description(&self) -> String {
        format!("A {}-sided dice", self.sides)
    }
}
conforms!(Dice => TextRepresentable);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hamster {
    name: String,
}
impl Hamster {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}
impl TextRepresentable for Hamster {
    fn text_description(&self) -> String {
        format!("A hamster named {}", self.name)
    }
}
impl PrettyTextRepresentable for Hamster {}
conforms!(Hamster => TextRepresentable, PrettyTextRepresentable);

// ------------- Optional requirements -------------
/// Both members are optional, a source overrides the ones it supports.
pub trait CounterDataSource {
    fn increment(&self, _count: i64) -> Option<i64> {
        None
    }
    fn fixed_increment(&self) -> Option<i64> {
        None
    }
}
contract!(CounterDataSource => ContractDescriptor::new("CounterDataSource")
    .offer(Member::method("increment", &["i64"], "Option<i64>"))
    .offer(Member::property("fixed_increment", "Option<i64>", Access::Get)));

#[derive(Default)]
pub struct Counter {
    count: i64,
    data_source: Option<Box<dyn CounterDataSource + Send + Sync>>,
}
impl Counter {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_data_source<S>(data_source: S) -> Self
    where
        S: CounterDataSource + Send + Sync + 'static,
    {
        Self {
            count: 0,
            data_source: Some(Box::new(data_source)),
        }
    }
    pub fn count(&self) -> i64 {
        self.count
    }
    pub fn set_count(&mut self, count: i64) {
        self.count = count;
    }
    pub fn increment(&mut self) {
        let count = self.count;
        let amount = self
            .data_source
            .as_ref()
            .and_then(|source| source.increment(count).or_else(|| source.fixed_increment()));
        // a source that keeps adding stops at the bounds of i64
        if let Some(amount) = amount {
            self.count = self.count.saturating_add(amount);
        }
    }
}
impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Counter")
            .field("count", &self.count)
            .field("has_data_source", &self.data_source.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreeSource;
impl CounterDataSource for ThreeSource {
    fn fixed_increment(&self) -> Option<i64> {
        Some(3)
    }
}
conforms!(ThreeSource => CounterDataSource);

/// Steps the count one towards zero and then stays there.
#[derive(Debug, Clone, Copy, Default)]
pub struct TowardsZeroSource;
impl CounterDataSource for TowardsZeroSource {
    fn increment(&self, count: i64) -> Option<i64> {
        Some(-count.signum())
    }
}
impl Described for TowardsZeroSource {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("TowardsZeroSource", Semantics::Value)
            .provide(Member::method("increment", &["i64"], "Option<i64>"))
    }
}
conforms!(TowardsZeroSource => CounterDataSource);

// ------------- Composition -------------
pub trait Named {
    fn name(&self) -> String;
}
contract!(Named => ContractDescriptor::new("Named")
    .require(Member::property("name", "String", Access::Get)));

pub trait Aged {
    fn age(&self) -> u32;
}
contract!(Aged => ContractDescriptor::new("Aged")
    .require(Member::property("age", "u32", Access::Get)));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Celebrant {
    name: String,
    age: u32,
}
impl Celebrant {
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }
}
impl Named for Celebrant {
    fn name(&self) -> String {
        self.name.clone()
    }
}
impl Aged for Celebrant {
    fn age(&self) -> u32 {
        self.age
    }
}
conforms!(Celebrant => Named, Aged);

pub fn wish_happy_birthday(celebrator: &(impl Named + Aged)) -> String {
    format!(
        "Happy birthday, {}, you're {}!",
        celebrator.name(),
        celebrator.age()
    )
}

pub trait Location: Object {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
}
contract!(Location => ContractDescriptor::new("Location")
    .inherits(<dyn Object as Contract>::descriptor())
    .require(Member::property("latitude", "f64", Access::Get))
    .require(Member::property("longitude", "f64", Access::Get)));

#[derive(Debug)]
struct Place {
    name: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Clone)]
pub struct City {
    place: Shared<Place>,
}
impl City {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            place: Shared::new(Place {
                name: name.into(),
                latitude,
                longitude,
            }),
        }
    }
    pub fn rename(&self, name: impl Into<String>) {
        self.place.write().name = name.into();
    }
}
impl Object for City {
    fn handle(&self) -> &dyn Handle {
        &self.place
    }
}
impl Location for City {
    fn latitude(&self) -> f64 {
        self.place.read().latitude
    }
    fn longitude(&self) -> f64 {
        self.place.read().longitude
    }
}
impl Named for City {
    fn name(&self) -> String {
        self.place.read().name.clone()
    }
}
conforms!(City => Object, Location, Named);

pub fn begin_concert(location: &(impl Location + Named)) -> String {
    format!("Hello, {}!", location.name())
}

// ------------- Checking for conformance -------------
pub trait HasArea {
    fn area(&self) -> f64;
}
contract!(HasArea => ContractDescriptor::new("HasArea")
    .require(Member::property("area", "f64", Access::Get)));

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    radius: f64,
}
impl Circle {
    pub fn new(radius: f64) -> Self {
        Self { radius }
    }
}
impl HasArea for Circle {
    fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }
}
impl Described for Circle {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("Circle", Semantics::Value)
            .provide(Member::property("radius", "f64", Access::GetSet))
            .provide(Member::property("area", "f64", Access::Get))
    }
}
conforms!(Circle => HasArea);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Country {
    area: f64,
}
impl Country {
    pub fn new(area: f64) -> Self {
        Self { area }
    }
}
impl HasArea for Country {
    fn area(&self) -> f64 {
        self.area
    }
}
conforms!(Country => HasArea);

// no area at all
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animal {
    legs: u32,
}
impl Animal {
    pub fn new(legs: u32) -> Self {
        Self { legs }
    }
    pub fn legs(&self) -> u32 {
        self.legs
    }
}

pub trait HasValue {
    fn value(&self) -> i64;
}
contract!(HasValue => ContractDescriptor::new("HasValue")
    .require(Member::property("value", "i64", Access::Get)));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructWithValue {
    value: i64,
}
impl StructWithValue {
    pub fn new(value: i64) -> Self {
        Self { value }
    }
}
impl HasValue for StructWithValue {
    fn value(&self) -> i64 {
        self.value
    }
}
impl Described for StructWithValue {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("StructWithValue", Semantics::Value)
            .provide(Member::property("value", "i64", Access::GetSet))
    }
}
conforms!(StructWithValue => HasValue);

#[derive(Debug, Clone)]
pub struct ClassWithValue {
    value: Shared<i64>,
}
impl ClassWithValue {
    pub fn new(value: i64) -> Self {
        Self {
            value: Shared::new(value),
        }
    }
    /// Visible through every clone.
    pub fn set_value(&self, value: i64) {
        *self.value.write() = value;
    }
}
impl HasValue for ClassWithValue {
    fn value(&self) -> i64 {
        *self.value.read()
    }
}
impl Object for ClassWithValue {
    fn handle(&self) -> &dyn Handle {
        &self.value
    }
}
impl Described for ClassWithValue {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("ClassWithValue", Semantics::Reference)
            .provide(Member::property("value", "i64", Access::GetSet))
            .provide(Member::method("handle", &[], "&dyn Handle"))
    }
}
conforms!(ClassWithValue => HasValue, Object);

// ------------- Registry -------------
/// A registry with every conformance of the catalog declared.
pub fn registry() -> Result<ConformanceRegistry> {
    let registry = ConformanceRegistry::new();

    registry.declare_described::<Person, dyn FullyNamed>()?;
    registry.declare_described::<Person, dyn Kinded>()?;
    registry.declare_described::<Starship, dyn FullyNamed>()?;
    registry.declare_described::<Dial, dyn Adjustable>()?;
    registry.declare_described::<Dial, dyn Kinded>()?;

    registry.declare::<LinearCongruentialGenerator, dyn RandomNumberGenerator>()?;
    registry.declare_described::<OnOffSwitch, dyn Togglable>()?;
    registry.declare_described::<Lamp, dyn Object>()?;
    registry.declare_described::<Lamp, dyn Togglable>()?;
    registry.declare::<Account, dyn Initializable>()?;
    registry.declare::<SavingsAccount, dyn Initializable>()?;

    registry.declare::<Dice, dyn TextRepresentable>()?;
    registry.declare::<Hamster, dyn TextRepresentable>()?;
    registry.declare::<Hamster, dyn PrettyTextRepresentable>()?;
    registry.declare::<SnakesAndLadders, dyn DiceGame>()?;
    registry.declare::<SnakesAndLadders, dyn TextRepresentable>()?;
    registry.declare::<SnakesAndLadders, dyn PrettyTextRepresentable>()?;
    registry.declare::<DiceGameTracker, dyn Object>()?;
    registry.declare::<DiceGameTracker, dyn DiceGameDelegate>()?;

    registry.declare::<ThreeSource, dyn CounterDataSource>()?;
    registry.declare_described::<TowardsZeroSource, dyn CounterDataSource>()?;

    registry.declare::<Celebrant, dyn Named>()?;
    registry.declare::<Celebrant, dyn Aged>()?;
    registry.declare::<City, dyn Object>()?;
    registry.declare::<City, dyn Location>()?;
    registry.declare::<City, dyn Named>()?;

    registry.declare_described::<Circle, dyn HasArea>()?;
    registry.declare::<Country, dyn HasArea>()?;
    registry.declare_described::<StructWithValue, dyn HasValue>()?;
    registry.declare_described::<ClassWithValue, dyn Object>()?;
    registry.declare_described::<ClassWithValue, dyn HasValue>()?;

    Ok(registry)
}
