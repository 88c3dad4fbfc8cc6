use crate::domain::ports::{InquiryStatus, InquiryStoreRef, RentalInquiry};
use crate::error::{Result, ShopError};
use chrono::Utc;

/// Customer-facing side of rental inquiries. Follow-up (status changes,
/// listing) happens through the admin surface.
#[derive(Clone)]
pub struct InquiryService {
    inquiries: InquiryStoreRef,
}

#[derive(Debug, Clone)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub work_name: Option<String>,
    pub rental_period: Option<String>,
    pub purpose: Option<String>,
    pub message: Option<String>,
}

impl InquiryService {
    pub fn new(inquiries: InquiryStoreRef) -> Self {
        Self { inquiries }
    }

    pub async fn submit(&self, inquiry: NewInquiry) -> Result<RentalInquiry> {
        if inquiry.name.trim().is_empty()
            || inquiry.email.trim().is_empty()
            || inquiry.phone.trim().is_empty()
        {
            return Err(ShopError::Validation(
                "inquiry name, email and phone are required".to_string(),
            ));
        }

        self.inquiries
            .insert(RentalInquiry {
                id: 0, // assigned by the store
                name: inquiry.name,
                email: inquiry.email,
                phone: inquiry.phone,
                work_name: inquiry.work_name,
                rental_period: inquiry.rental_period,
                purpose: inquiry.purpose,
                message: inquiry.message,
                status: InquiryStatus::New,
                created_at: Utc::now(),
            })
            .await
    }
}
