use crate::domain::{MemberId, MembershipCategory, Role};
use crate::ports::member_directory::{MemberDirectory as MemberDirectoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

/// 文字列列を列挙型に変換する
///
/// 不正な値はInvalidDataとして扱う。
fn parse_column<T>(row: &PgRow, column: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    let value: &str = row.try_get(column)?;
    value.parse::<T>().map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })
}

/// MemberDirectoryのPostgreSQL実装
///
/// 会員サブシステムが管理する`members`テーブルを読み取り専用で参照する。
#[derive(Clone)]
pub struct MemberDirectory {
    pool: PgPool,
}

impl MemberDirectory {
    /// PostgreSQLコネクションプールから新しいMemberDirectoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberDirectoryTrait for MemberDirectory {
    async fn membership_category(
        &self,
        member_id: MemberId,
    ) -> Result<Option<MembershipCategory>> {
        let row = sqlx::query(
            r#"
            SELECT membership_category
            FROM members
            WHERE member_id = $1
            "#,
        )
        .bind(member_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| parse_column(&row, "membership_category"))
            .transpose()
    }

    async fn role(&self, member_id: MemberId) -> Result<Option<Role>> {
        let row = sqlx::query(
            r#"
            SELECT role
            FROM members
            WHERE member_id = $1
            "#,
        )
        .bind(member_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| parse_column(&row, "role")).transpose()
    }
}
