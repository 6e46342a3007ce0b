use serde::{Deserialize, Serialize};

use super::{BookId, StockError};

/// 書籍1タイトルの在庫
///
/// 不変条件：`0 <= available_copies <= total_copies`
///
/// フィールドは非公開とし、`checkout`/`checkin`以外で
/// 貸出可能冊数を変更できないようにする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookStock {
    book_id: BookId,
    total_copies: u32,
    available_copies: u32,
}

impl BookStock {
    /// 新規登録時の在庫（全冊貸出可能）
    pub fn new(book_id: BookId, total_copies: u32) -> Self {
        Self {
            book_id,
            total_copies,
            available_copies: total_copies,
        }
    }

    /// 永続化された値から復元する
    ///
    /// # エラー
    /// 貸出可能冊数が所蔵冊数を超えている場合は`StockError::InvariantViolation`
    pub fn restore(
        book_id: BookId,
        total_copies: u32,
        available_copies: u32,
    ) -> Result<Self, StockError> {
        if available_copies > total_copies {
            return Err(StockError::InvariantViolation);
        }
        Ok(Self {
            book_id,
            total_copies,
            available_copies,
        })
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    pub fn total_copies(&self) -> u32 {
        self.total_copies
    }

    pub fn available_copies(&self) -> u32 {
        self.available_copies
    }

    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    /// 1冊貸し出す
    pub fn checkout(self) -> Result<Self, StockError> {
        if self.available_copies == 0 {
            return Err(StockError::Unavailable);
        }
        Ok(Self {
            available_copies: self.available_copies - 1,
            ..self
        })
    }

    /// 1冊戻す
    pub fn checkin(self) -> Result<Self, StockError> {
        if self.available_copies >= self.total_copies {
            return Err(StockError::InvariantViolation);
        }
        Ok(Self {
            available_copies: self.available_copies + 1,
            ..self
        })
    }
}
