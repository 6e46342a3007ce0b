use super::{
    MembershipCategory, Money, SettleFineError,
    loan::{ClosedLoan, days_overdue},
};

/// 延滞料金の日額
///
/// 職員は延滞料金の対象外（`None`）。
pub fn daily_rate(category: MembershipCategory) -> Option<Money> {
    match category {
        MembershipCategory::Public => Some(Money::new(10)),
        MembershipCategory::Student => Some(Money::new(5)),
        MembershipCategory::Staff => None,
    }
}

/// 返却結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnOutcome {
    /// 期限内の返却（または延滞料金の対象外）
    OnTime,
    /// 延滞。`fine`が会員の残高に加算される
    Late { days_overdue: u64, fine: Money },
}

impl ReturnOutcome {
    /// 残高に加算すべき金額
    pub fn fine(&self) -> Money {
        match self {
            ReturnOutcome::OnTime => Money::ZERO,
            ReturnOutcome::Late { fine, .. } => *fine,
        }
    }
}

/// 純粋関数：返却時の延滞料金を算定する
///
/// ビジネスルール：
/// - 職員は延滞していても料金なし（期限内扱い）
/// - 延滞日数 × 日額（一般10、学生5）
/// - 返却日が返却期限と同日なら期限内
pub fn assess_fine(category: MembershipCategory, loan: &ClosedLoan) -> ReturnOutcome {
    let Some(rate) = daily_rate(category) else {
        return ReturnOutcome::OnTime;
    };

    let days = days_overdue(loan.due_date, loan.return_date);
    if days == 0 {
        return ReturnOutcome::OnTime;
    }

    ReturnOutcome::Late {
        days_overdue: days,
        fine: Money::new(days.saturating_mul(rate.value())),
    }
}

/// 純粋関数：支払額を検証する
///
/// ビジネスルール：
/// - 残高0なら支払い不可
/// - 負の支払額は不正
/// - 残高を超える支払いは拒否（残高は変わらない）
///
/// # 戻り値
/// 残高から差し引く金額
pub fn settle_fine(balance: Money, payment: i64) -> Result<Money, SettleFineError> {
    if balance.is_zero() {
        return Err(SettleFineError::NoFineDue);
    }
    let paid = Money::try_from(payment).map_err(|_| SettleFineError::InvalidAmount)?;
    if paid > balance {
        return Err(SettleFineError::OverpaymentRejected);
    }
    Ok(paid)
}
