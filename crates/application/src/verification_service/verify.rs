use super::*;

impl VerificationService {
    /// Verifies a token, counts the outcome against the caller identity and
    /// appends it to the verification log.
    ///
    /// Verifier failures become a failed outcome with
    /// [`INTERNAL_ERROR_CODE`]. Log persistence failures are reported in the
    /// outcome, never as an error.
    pub async fn verify_and_log(&self, request: VerificationRequest) -> VerificationOutcome {
        let verification = match self
            .verifier
            .verify(request.token.as_str(), request.remote_ip.as_deref())
            .await
        {
            Ok(verification) => verification,
            Err(error) => {
                warn!(identity_key = %request.identity_key, %error, "token verifier unavailable");
                TokenVerification::failed([INTERNAL_ERROR_CODE])
            }
        };

        let token_ref = token_fingerprint(request.token.as_str());
        self.cache.record_outcome(
            &request.identity_key,
            verification.success,
            Some(token_ref.clone()),
            request.page.clone(),
        );

        let device = request
            .user_agent
            .as_deref()
            .map(|user_agent| DeviceClass::from_user_agent(user_agent).as_str().to_owned());
        let entry = NewVerificationLogEntry {
            token_ref,
            page: request.page,
            success: verification.success,
            ip_address: request.remote_ip,
            user_agent: request.user_agent,
            device,
        };

        let log_entry = match self.log_repository.append_entry(entry).await {
            Ok(log_entry) => Some(log_entry),
            Err(error) => {
                warn!(identity_key = %request.identity_key, %error, "failed to store verification log entry");
                None
            }
        };

        VerificationOutcome {
            verification,
            log_entry,
        }
    }
}
