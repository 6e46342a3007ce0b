use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// 取引ID - 貸出記録の識別子（貸出時に生成）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 書籍ID - カタログ管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookId(Uuid);

impl BookId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for BookId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 会員ID - 会員管理コンテキストへの参照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(Uuid);

impl MemberId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 金額（単一通貨、非負の整数）
///
/// 延滞料金・支払額はすべてこの型で扱う。
/// 負の値は型として表現できない。
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// 減算。結果が負になる場合は`None`
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }
}

impl TryFrom<i64> for Money {
    type Error = InvalidMoney;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u64::try_from(value).map(Money).map_err(|_| InvalidMoney(value))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// 負の金額
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("amount must not be negative: {0}")]
pub struct InvalidMoney(pub i64);

/// 会員種別
///
/// 延滞料金の日額はこの種別で決まる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipCategory {
    Public,
    Student,
    Staff,
}

impl MembershipCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipCategory::Public => "public",
            MembershipCategory::Student => "student",
            MembershipCategory::Staff => "staff",
        }
    }
}

impl FromStr for MembershipCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(MembershipCategory::Public),
            "student" => Ok(MembershipCategory::Student),
            "staff" => Ok(MembershipCategory::Staff),
            _ => Err(format!("Invalid membership category: {}", s)),
        }
    }
}

/// 利用者ロール
///
/// 呼び出し側（API層）がどの操作を公開するかを決める。
/// 貸出エンジン自体はロールを検査しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Borrower,
    Librarian,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Borrower => "borrower",
            Role::Librarian => "librarian",
            Role::Admin => "admin",
        }
    }

    /// 書籍登録・延滞料金の受領ができるか
    pub fn can_manage_circulation(&self) -> bool {
        matches!(self, Role::Librarian | Role::Admin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "borrower" => Ok(Role::Borrower),
            "librarian" => Ok(Role::Librarian),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_id_creation() {
        let id1 = TransactionId::new();
        let id2 = TransactionId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_transaction_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = TransactionId::from_uuid(uuid);
        assert_eq!(id.value(), uuid);
    }

    #[test]
    fn test_book_id_creation() {
        let id1 = BookId::new();
        let id2 = BookId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_member_id_creation() {
        let id1 = MemberId::new();
        let id2 = MemberId::new();
        assert_ne!(id1, id2);
    }

    // Money のテスト
    #[test]
    fn test_money_try_from_rejects_negative() {
        assert_eq!(Money::try_from(-1), Err(InvalidMoney(-1)));
        assert_eq!(Money::try_from(0), Ok(Money::ZERO));
        assert_eq!(Money::try_from(60), Ok(Money::new(60)));
    }

    #[test]
    fn test_money_checked_sub_never_goes_negative() {
        assert_eq!(Money::new(60).checked_sub(Money::new(20)), Some(Money::new(40)));
        assert_eq!(Money::new(60).checked_sub(Money::new(60)), Some(Money::ZERO));
        assert_eq!(Money::new(20).checked_sub(Money::new(60)), None);
    }

    #[test]
    fn test_membership_category_round_trips_through_str() {
        for category in [
            MembershipCategory::Public,
            MembershipCategory::Student,
            MembershipCategory::Staff,
        ] {
            assert_eq!(category.as_str().parse::<MembershipCategory>(), Ok(category));
        }
        assert!("faculty".parse::<MembershipCategory>().is_err());
    }

    #[test]
    fn test_role_management_permissions() {
        assert!(!Role::Borrower.can_manage_circulation());
        assert!(Role::Librarian.can_manage_circulation());
        assert!(Role::Admin.can_manage_circulation());
        assert_eq!("librarian".parse::<Role>(), Ok(Role::Librarian));
    }
}
