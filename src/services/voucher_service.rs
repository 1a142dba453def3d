use crate::entities::{DiscountType, voucher_entity as vouchers};
use crate::error::{AppError, AppResult};
use crate::models::{PaginatedResponse, PaginationParams, VoucherQuery, VoucherResponse};
use crate::utils::generate_voucher_code;
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone)]
pub struct IssueVoucher {
    pub owner_user_id: i64,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub validity_days: i64,
    pub max_uses: i32,
    /// 幂等键；同一 reference 只会生成一张券
    pub reference: Option<String>,
    pub code_prefix: &'static str,
}

#[derive(Debug, Clone)]
pub struct IssuedVoucher {
    pub voucher: vouchers::Model,
    /// false when an earlier issuance with the same reference was returned
    pub newly_issued: bool,
}

#[derive(Clone)]
pub struct VoucherService {
    pool: DatabaseConnection,
}

impl VoucherService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn issue(&self, request: IssueVoucher) -> AppResult<IssuedVoucher> {
        self.issue_at(request, Utc::now()).await
    }

    pub async fn issue_at(&self, request: IssueVoucher, now: DateTime<Utc>) -> AppResult<IssuedVoucher> {
        validate(&request)?;

        if let Some(reference) = request.reference.as_deref()
            && let Some(existing) = self.find_by_reference(reference).await?
        {
            log::info!("Voucher for {reference} already issued as {}", existing.code);
            return Ok(IssuedVoucher {
                voucher: existing,
                newly_issued: false,
            });
        }

        let valid_to = now + Duration::days(request.validity_days);

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_voucher_code(request.code_prefix);
            let inserted = vouchers::Entity::insert(vouchers::ActiveModel {
                code: Set(code.clone()),
                discount_type: Set(request.discount_type),
                discount_value: Set(request.discount_value),
                owner_user_id: Set(request.owner_user_id),
                max_uses: Set(request.max_uses),
                used_count: Set(0),
                valid_from: Set(now),
                valid_to: Set(valid_to),
                is_active: Set(true),
                reference: Set(request.reference.clone()),
                created_at: Set(now),
                ..Default::default()
            })
            .on_conflict(OnConflict::new().do_nothing().to_owned())
            .exec_without_returning(&self.pool)
            .await?;

            if inserted == 1 {
                let voucher = vouchers::Entity::find()
                    .filter(vouchers::Column::Code.eq(code.as_str()))
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| DbErr::RecordNotFound(format!("voucher {code}")))?;
                log::info!(
                    "Issued voucher {} ({} {}) to user {}",
                    voucher.code,
                    voucher.discount_value,
                    voucher.discount_type,
                    voucher.owner_user_id
                );
                return Ok(IssuedVoucher {
                    voucher,
                    newly_issued: true,
                });
            }

            // 冲突可能来自并发的同 reference 发放，也可能是券码碰撞
            if let Some(reference) = request.reference.as_deref()
                && let Some(existing) = self.find_by_reference(reference).await?
            {
                return Ok(IssuedVoucher {
                    voucher: existing,
                    newly_issued: false,
                });
            }
            log::warn!("Voucher code collision on attempt {attempt}, regenerating");
        }

        Err(AppError::InternalError(
            "Unable to generate a unique voucher code".to_string(),
        ))
    }

    pub async fn find_by_reference(&self, reference: &str) -> Result<Option<vouchers::Model>, DbErr> {
        vouchers::Entity::find()
            .filter(vouchers::Column::Reference.eq(reference))
            .one(&self.pool)
            .await
    }

    pub async fn list_for_user(
        &self,
        user_id: i64,
        query: &VoucherQuery,
    ) -> AppResult<PaginatedResponse<VoucherResponse>> {
        let params = PaginationParams::new(query.page, query.per_page);
        let now = Utc::now();

        let mut base_query =
            vouchers::Entity::find().filter(vouchers::Column::OwnerUserId.eq(user_id));
        if query.active_only.unwrap_or(false) {
            base_query = base_query
                .filter(vouchers::Column::IsActive.eq(true))
                .filter(vouchers::Column::ValidTo.gte(now));
        }

        let total = base_query.clone().count(&self.pool).await? as i64;
        let items = base_query
            .order_by(vouchers::Column::CreatedAt, Order::Desc)
            .order_by(vouchers::Column::Id, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|v| VoucherResponse::from_model(v, now))
            .collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_limit(),
            total,
        ))
    }
}

fn validate(request: &IssueVoucher) -> AppResult<()> {
    if request.discount_value <= 0 {
        return Err(AppError::ValidationError(
            "Voucher value must be positive".to_string(),
        ));
    }
    if request.discount_type == DiscountType::Percentage && request.discount_value > 100 {
        return Err(AppError::ValidationError(
            "Percentage voucher cannot exceed 100".to_string(),
        ));
    }
    if request.validity_days <= 0 || request.max_uses <= 0 {
        return Err(AppError::ValidationError(
            "Voucher validity and max uses must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(discount_type: DiscountType, value: i64) -> IssueVoucher {
        IssueVoucher {
            owner_user_id: 1,
            discount_type,
            discount_value: value,
            validity_days: 14,
            max_uses: 1,
            reference: None,
            code_prefix: "SPIN",
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(validate(&request(DiscountType::Percentage, 10)).is_ok());
        assert!(validate(&request(DiscountType::Fixed, 2_500)).is_ok());
        assert!(validate(&request(DiscountType::Percentage, 101)).is_err());
        assert!(validate(&request(DiscountType::Fixed, 0)).is_err());

        let mut no_uses = request(DiscountType::Fixed, 100);
        no_uses.max_uses = 0;
        assert!(validate(&no_uses).is_err());
    }
}
