use crate::error::AppError;
use actix_web::web;
use bcrypt::{hash, verify};

/// Hashes and checks passwords with bcrypt on the blocking thread pool.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    /// Hash checked against when the user does not exist, so a failed login
    /// costs the same whichever check failed.
    dummy_hash: String,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash("taskboard-dummy-password", cost)?;
        Ok(Self { cost, dummy_hash })
    }

    pub async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.cost;
        let hashed = web::block(move || hash(password, cost)).await??;
        Ok(hashed)
    }

    pub async fn verify_password(
        &self,
        password: &str,
        hashed_password: &str,
    ) -> Result<bool, AppError> {
        let password = password.to_owned();
        let hashed_password = hashed_password.to_owned();
        web::block(move || verify(password, &hashed_password))
            .await?
            .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
    }

    /// Burns one verification for a login against an unknown username.
    pub async fn verify_against_dummy(&self, password: &str) -> Result<(), AppError> {
        self.verify_password(password, &self.dummy_hash)
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_password_hashing_and_verification() {
        let hasher = PasswordHasher::new(4).unwrap();
        let password = "test_password123";
        let hashed = hasher.hash_password(password).await.unwrap();

        assert_ne!(hashed, password);
        assert!(hasher.verify_password(password, &hashed).await.unwrap());
        assert!(!hasher
            .verify_password("wrong_password", &hashed)
            .await
            .unwrap());
    }

    #[actix_rt::test]
    async fn test_verify_with_invalid_hash() {
        let hasher = PasswordHasher::new(4).unwrap();
        match hasher
            .verify_password("test_password123", "invalidhashformat")
            .await
        {
            Err(AppError::Internal(msg)) => {
                assert!(msg.contains("Failed to verify password"));
            }
            Ok(false) => {}
            Ok(true) => panic!("Password verification should fail for invalid hash format"),
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    #[actix_rt::test]
    async fn test_dummy_verification_succeeds() {
        let hasher = PasswordHasher::new(4).unwrap();
        assert!(hasher.verify_against_dummy("anything").await.is_ok());
    }

    #[test]
    fn test_invalid_cost_is_rejected() {
        assert!(PasswordHasher::new(2).is_err());
    }
}
