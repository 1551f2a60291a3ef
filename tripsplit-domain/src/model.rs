use std::{
    borrow::Cow,
    collections::BTreeMap,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use fxhash::{FxHashMap, FxHashSet};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{InvalidExpense, TripError};

/// Index of a participant inside its [`ParticipantRegistry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantId(pub u32);

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Balance table keyed by participant. Iteration follows registration order.
pub type MemberBalances = BTreeMap<ParticipantId, Money>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn signum(self) -> i64 {
        if self.is_positive() {
            1
        } else if self.is_negative() {
            -1
        } else {
            0
        }
    }

    /// Formats with exactly `decimals` fractional digits, rounding half away
    /// from zero. Zero never carries a sign.
    pub fn to_fixed(self, decimals: u32) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
        let rounded = if rounded.is_zero() {
            Decimal::ZERO
        } else {
            rounded
        };
        format!("{rounded:.prec$}", prec = decimals as usize)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Self)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    id: ParticipantId,
    name: String,
}

impl Participant {
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Arena of participants. Ids are handed out densely in registration order.
#[derive(Clone, Debug, Default)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
    by_name: FxHashMap<String, ParticipantId>,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_from_names<I, S>(names: I) -> Result<Self, TripError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.register(name)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, name: impl Into<String>) -> Result<ParticipantId, TripError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TripError::DuplicateParticipant { name });
        }

        let id = ParticipantId(self.participants.len() as u32);
        self.by_name.insert(name.clone(), id);
        self.participants.push(Participant { id, name });
        Ok(id)
    }

    pub fn get(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(id.0 as usize)
    }

    pub fn name(&self, id: ParticipantId) -> Option<&str> {
        self.get(id).map(Participant::name)
    }

    pub fn find(&self, name: &str) -> Option<ParticipantId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        (id.0 as usize) < self.participants.len()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> + '_ {
        self.participants.iter()
    }

    pub fn everyone(&self) -> ParticipantGroup {
        self.participants.iter().map(Participant::id).collect()
    }
}

/// Sorted, de-duplicated set of participants.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ParticipantGroup {
    members: Vec<ParticipantId>,
}

impl ParticipantGroup {
    pub fn new<I>(members: I) -> Self
    where
        I: IntoIterator<Item = ParticipantId>,
    {
        let mut members: Vec<ParticipantId> = members.into_iter().collect();
        members.sort_unstable();
        members.dedup();
        Self { members }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns a new group without `exclusions`. Ids that are not members are
    /// ignored.
    pub fn except<I>(&self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = ParticipantId>,
    {
        let excluded: FxHashSet<ParticipantId> = exclusions.into_iter().collect();
        Self {
            members: self
                .members
                .iter()
                .copied()
                .filter(|member| !excluded.contains(member))
                .collect(),
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.iter().chain(other.iter()))
    }

    pub fn difference(&self, other: &Self) -> Self {
        self.except(other.iter())
    }

    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    pub fn iter(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.members.iter().copied()
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.members.binary_search(&id).is_ok()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl FromIterator<ParticipantId> for ParticipantGroup {
    fn from_iter<T: IntoIterator<Item = ParticipantId>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberSetOp<'a> {
    Push(ParticipantId),
    PushGroup(&'a str),
    Union,
    Difference,
}

/// Group expression in postfix order, e.g. `[PushGroup("MEMBERS"), Push(3), Difference]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberSetExpr<'a> {
    ops: Vec<MemberSetOp<'a>>,
}

impl<'a> MemberSetExpr<'a> {
    pub fn new(ops: Vec<MemberSetOp<'a>>) -> Self {
        Self { ops }
    }

    pub fn ops(&self) -> &[MemberSetOp<'a>] {
        &self.ops
    }

    pub fn evaluate<'b, F>(&self, resolver: &F) -> Option<Cow<'b, ParticipantGroup>>
    where
        F: Fn(&str) -> Option<&'b ParticipantGroup>,
    {
        let mut stack: Vec<Cow<'b, ParticipantGroup>> = Vec::with_capacity(self.ops.len());

        for op in &self.ops {
            match op {
                MemberSetOp::Push(id) => {
                    stack.push(Cow::Owned(ParticipantGroup::new([*id])));
                }
                MemberSetOp::PushGroup(name) => {
                    let group = resolver(name)?;
                    stack.push(Cow::Borrowed(group));
                }
                MemberSetOp::Union => {
                    let b = stack.pop()?;
                    let a = stack.pop()?;
                    stack.push(Cow::Owned(a.union(&b)));
                }
                MemberSetOp::Difference => {
                    let b = stack.pop()?;
                    let a = stack.pop()?;
                    stack.push(Cow::Owned(a.difference(&b)));
                }
            }
        }

        if stack.len() == 1 { stack.pop() } else { None }
    }
}

/// A single expense: `payer` covered `amount` for every member of
/// `beneficiaries`. The payer may or may not be a beneficiary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    amount: Money,
    payer: ParticipantId,
    beneficiaries: ParticipantGroup,
}

impl Expense {
    pub fn try_new(
        amount: Money,
        payer: ParticipantId,
        beneficiaries: ParticipantGroup,
    ) -> Result<Self, InvalidExpense> {
        if !amount.is_positive() {
            return Err(InvalidExpense::NonPositiveAmount(amount));
        }
        if beneficiaries.is_empty() {
            return Err(InvalidExpense::EmptyBeneficiaries);
        }

        Ok(Self {
            amount,
            payer,
            beneficiaries,
        })
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn payer(&self) -> ParticipantId {
        self.payer
    }

    pub fn beneficiaries(&self) -> &ParticipantGroup {
        &self.beneficiaries
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
}

#[derive(Debug, PartialEq)]
pub struct Settlement {
    pub new_balances: MemberBalances,
    pub transfers: Vec<Transfer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonBalance {
    pub id: ParticipantId,
    pub balance: Money,
}

/// Snapshot rows ordered by ascending balance, ties by participant id.
pub fn sorted_balances(balances: &MemberBalances) -> Vec<PersonBalance> {
    let mut rows: Vec<PersonBalance> = balances
        .iter()
        .map(|(id, balance)| PersonBalance {
            id: *id,
            balance: *balance,
        })
        .collect();
    rows.sort_by(|lhs, rhs| {
        lhs.balance
            .cmp(&rhs.balance)
            .then_with(|| lhs.id.cmp(&rhs.id))
    });
    rows
}
