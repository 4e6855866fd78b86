//! CheckoutService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;

    use checkout_types::{
        Amount, ApiKey, ApiKeyId, AppError, CheckoutRepository, CreateGatewayRequest,
        CreatePaymentMethodRequest, CreateTransactionRequest, CreateUserRequest, Currency, Gateway,
        GatewayId, PaymentMethod, Provider, RepoError, Role, SubType, Transaction,
        TransactionStatus, TransactionWithUser, UpdateGatewayRequest, User, UserId,
    };

    use crate::CheckoutService;

    /// Simple in-memory repository for testing the service layer.
    ///
    /// With `fail` set, every call returns a database error.
    pub struct MockRepo {
        gateways: Mutex<HashMap<GatewayId, Gateway>>,
        methods: Mutex<Vec<PaymentMethod>>,
        transactions: Mutex<Vec<Transaction>>,
        users: Mutex<Vec<User>>,
        keys: Mutex<Vec<ApiKey>>,
        fail: AtomicBool,
    }

    impl MockRepo {
        pub fn new() -> Self {
            Self {
                gateways: Mutex::new(HashMap::new()),
                methods: Mutex::new(Vec::new()),
                transactions: Mutex::new(Vec::new()),
                users: Mutex::new(Vec::new()),
                keys: Mutex::new(Vec::new()),
                fail: AtomicBool::new(false),
            }
        }

        pub fn failing() -> Self {
            let repo = Self::new();
            repo.fail.store(true, Ordering::SeqCst);
            repo
        }

        fn check(&self) -> Result<(), RepoError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(RepoError::Database("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl CheckoutRepository for MockRepo {
        async fn create_gateway(&self, req: CreateGatewayRequest) -> Result<Gateway, RepoError> {
            self.check()?;
            let gateway = Gateway::new(req)?;
            self.gateways
                .lock()
                .unwrap()
                .insert(gateway.id, gateway.clone());
            Ok(gateway)
        }

        async fn get_gateway(&self, id: GatewayId) -> Result<Option<Gateway>, RepoError> {
            self.check()?;
            Ok(self.gateways.lock().unwrap().get(&id).cloned())
        }

        async fn list_gateways(&self) -> Result<Vec<Gateway>, RepoError> {
            self.check()?;
            let mut gateways: Vec<_> = self.gateways.lock().unwrap().values().cloned().collect();
            gateways.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(gateways)
        }

        async fn update_gateway(
            &self,
            id: GatewayId,
            patch: UpdateGatewayRequest,
        ) -> Result<Gateway, RepoError> {
            self.check()?;
            let mut gateways = self.gateways.lock().unwrap();
            let gateway = gateways.get_mut(&id).ok_or(RepoError::NotFound)?;
            gateway.apply(patch)?;
            Ok(gateway.clone())
        }

        async fn set_gateway_status(
            &self,
            id: GatewayId,
            status: bool,
        ) -> Result<Gateway, RepoError> {
            self.check()?;
            let mut gateways = self.gateways.lock().unwrap();
            let gateway = gateways.get_mut(&id).ok_or(RepoError::NotFound)?;
            gateway.status = status;
            Ok(gateway.clone())
        }

        async fn delete_gateway(&self, id: GatewayId) -> Result<(), RepoError> {
            self.check()?;
            self.gateways
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or(RepoError::NotFound)
        }

        async fn list_active_payment_methods(&self) -> Result<Vec<PaymentMethod>, RepoError> {
            self.check()?;
            Ok(self
                .methods
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.active)
                .cloned()
                .collect())
        }

        async fn upsert_payment_method(
            &self,
            req: CreatePaymentMethodRequest,
        ) -> Result<PaymentMethod, RepoError> {
            self.check()?;
            let now = Utc::now();
            let method = PaymentMethod {
                id: Some(uuid::Uuid::new_v4()),
                name: req.name,
                icon: req.icon,
                active: req.active,
                config: req.config,
                created_at: Some(now),
                updated_at: Some(now),
            };
            let mut methods = self.methods.lock().unwrap();
            methods.retain(|m| m.name != method.name);
            methods.push(method.clone());
            Ok(method)
        }

        async fn create_transaction(
            &self,
            req: CreateTransactionRequest,
        ) -> Result<Transaction, RepoError> {
            self.check()?;
            let tx = Transaction::pending(req.amount, req.currency, req.method, req.user_id);
            self.transactions.lock().unwrap().push(tx.clone());
            Ok(tx)
        }

        async fn list_transactions(&self) -> Result<Vec<TransactionWithUser>, RepoError> {
            self.check()?;
            Ok(self
                .transactions
                .lock()
                .unwrap()
                .iter()
                .rev()
                .map(|tx| TransactionWithUser {
                    transaction: tx.clone(),
                    user: None,
                })
                .collect())
        }

        async fn create_user(&self, req: CreateUserRequest) -> Result<User, RepoError> {
            self.check()?;
            let user = User::new(req.id, req.name, req.email)?;
            self.users.lock().unwrap().push(user.clone());
            Ok(user)
        }

        async fn list_customers(&self) -> Result<Vec<User>, RepoError> {
            self.check()?;
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.role == Role::User)
                .cloned()
                .collect())
        }

        async fn set_user_role(&self, email: &str, role: Role) -> Result<User, RepoError> {
            self.check()?;
            let mut users = self.users.lock().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.email == email)
                .ok_or(RepoError::NotFound)?;
            user.role = role;
            Ok(user.clone())
        }

        async fn create_api_key(&self, name: &str) -> Result<(ApiKey, String), RepoError> {
            self.check()?;
            let raw_key = checkout_repo::security::generate_api_key();
            let key = ApiKey {
                id: ApiKeyId::new(),
                name: name.to_string(),
                key_hash: checkout_repo::security::hash_api_key(&raw_key),
                is_active: true,
                created_at: Utc::now(),
                last_used_at: None,
            };
            self.keys.lock().unwrap().push(key.clone());
            Ok((key, raw_key))
        }

        async fn count_api_keys(&self) -> Result<i64, RepoError> {
            self.check()?;
            Ok(self.keys.lock().unwrap().iter().filter(|k| k.is_active).count() as i64)
        }

        async fn verify_api_key_hash(&self, key_hash: &str) -> Result<Option<ApiKey>, RepoError> {
            self.check()?;
            Ok(self
                .keys
                .lock()
                .unwrap()
                .iter()
                .find(|k| k.is_active && k.key_hash == key_hash)
                .cloned())
        }
    }

    fn service() -> CheckoutService<MockRepo> {
        CheckoutService::new(MockRepo::new())
    }

    fn tx_request(amount: u32) -> CreateTransactionRequest {
        CreateTransactionRequest {
            amount: Amount::whole(amount),
            currency: Currency::BDT,
            method: Provider::Bkash,
            user_id: UserId::new("u1"),
        }
    }

    #[tokio::test]
    async fn test_gateway_lifecycle() {
        let service = service();

        let mut draft = CreateGatewayRequest::draft("Nagad Personal", Provider::Nagad, SubType::Personal);
        draft.config = Some(serde_json::json!({"walletNumber": "01700000000"}));
        let gateway = service.create_gateway(draft).await.unwrap();
        assert!(!gateway.status);

        let enabled = service.set_gateway_status(gateway.id, true).await.unwrap();
        assert!(enabled.status);

        let patched = service
            .update_gateway(
                gateway.id,
                UpdateGatewayRequest {
                    display_name: Some("Nagad (Personal)".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.display_name, "Nagad (Personal)");
        assert_eq!(patched.name, "Nagad Personal");

        service.delete_gateway(gateway.id).await.unwrap();
        let result = service.get_gateway(gateway.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_gateway_is_not_found() {
        let service = service();
        let id = GatewayId::new();

        assert!(matches!(
            service.set_gateway_status(id, true).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_gateway(id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.update_gateway(id, UpdateGatewayRequest::default()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_gateway_draft_is_bad_request() {
        let service = service();
        let draft = CreateGatewayRequest::draft("  ", Provider::Bkash, SubType::Personal);

        let result = service.create_gateway(draft).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_list_gateways_is_empty_when_store_fails() {
        let service = CheckoutService::new(MockRepo::failing());
        assert!(service.list_gateways().await.is_empty());
    }

    #[tokio::test]
    async fn test_gateway_choices_use_enabled_gateways() {
        let service = service();
        // Nothing configured yet: the single default entry.
        let choices = service.gateway_choices("bkash").await.unwrap();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].gateway_id, None);
        assert_eq!(choices[0].display_name, "bKash Personal");

        let mut draft = CreateGatewayRequest::draft("bKash Agent", Provider::Bkash, SubType::Agent);
        draft.status = true;
        let gateway = service.create_gateway(draft).await.unwrap();

        let choices = service.gateway_choices("bkash").await.unwrap();
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].gateway_id, Some(gateway.id));
        assert_eq!(choices[0].sub_type, SubType::Agent);
    }

    #[tokio::test]
    async fn test_gateway_choices_for_unknown_option_is_not_found() {
        let result = service().gateway_choices("paypal").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_payment_methods_fall_back_when_store_fails() {
        let service = CheckoutService::new(MockRepo::failing());
        let methods = service.list_active_payment_methods().await;
        assert_eq!(methods, PaymentMethod::fallback());
    }

    #[tokio::test]
    async fn test_payment_methods_fall_back_when_none_active() {
        let service = service();
        service
            .create_payment_method(CreatePaymentMethodRequest {
                name: "bKash".into(),
                icon: "bkash.png".into(),
                active: false,
                config: serde_json::json!({}),
            })
            .await
            .unwrap();

        let methods = service.list_active_payment_methods().await;
        assert_eq!(methods, PaymentMethod::fallback());
    }

    #[tokio::test]
    async fn test_stored_payment_methods_replace_fallback() {
        let service = service();
        service
            .create_payment_method(CreatePaymentMethodRequest {
                name: "Nagad".into(),
                icon: "nagad.png".into(),
                active: true,
                config: serde_json::json!({"type": "personal"}),
            })
            .await
            .unwrap();

        let methods = service.list_active_payment_methods().await;
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name, "Nagad");
        assert!(methods[0].id.is_some());
    }

    #[tokio::test]
    async fn test_payment_method_requires_name_and_icon() {
        let service = service();
        let result = service
            .create_payment_method(CreatePaymentMethodRequest {
                name: "bKash".into(),
                icon: "".into(),
                active: true,
                config: serde_json::json!({}),
            })
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_transaction_starts_pending() {
        let service = service();
        let tx = service.create_transaction(tx_request(2200)).await.unwrap();

        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.amount, Amount::whole(2200));

        let listed = service.list_transactions().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].transaction.id, tx.id);
    }

    #[tokio::test]
    async fn test_zero_amount_is_rejected() {
        let service = service();
        let result = service.create_transaction(tx_request(0)).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_transaction_list_surfaces_store_failure() {
        let service = CheckoutService::new(MockRepo::failing());
        let result = service.list_transactions().await;
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_customers_exclude_admins() {
        let service = service();
        for (id, email) in [("u1", "a@example.com"), ("u2", "b@example.com")] {
            service
                .repo()
                .create_user(CreateUserRequest {
                    id: UserId::new(id),
                    name: id.to_uppercase(),
                    email: email.into(),
                })
                .await
                .unwrap();
        }
        service
            .repo()
            .set_user_role("b@example.com", Role::Admin)
            .await
            .unwrap();

        let page = service.list_customers().await;
        assert_eq!(page.total, 1);
        assert_eq!(page.customers[0].email, "a@example.com");
    }

    #[tokio::test]
    async fn test_customers_are_empty_when_store_fails() {
        let service = CheckoutService::new(MockRepo::failing());
        let page = service.list_customers().await;
        assert_eq!(page.total, 0);
        assert!(page.customers.is_empty());
    }

    #[tokio::test]
    async fn test_bootstrap_only_once() {
        let service = service();

        let raw_key = service.bootstrap("admin-console").await.unwrap();
        assert!(raw_key.starts_with("sk_"));
        assert!(service.is_admin(&raw_key).await.unwrap());
        assert!(!service.is_admin("sk_not_a_key").await.unwrap());

        let second = service.bootstrap("again").await;
        assert!(matches!(second, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_unbacked_admin_pages_are_empty() {
        let service = service();
        assert_eq!(service.list_invoices().total, 0);
        assert_eq!(service.list_payment_links().total, 0);
        assert!(service.list_sms_data().sms_data.is_empty());
    }
}
