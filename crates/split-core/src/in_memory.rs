//! # In-Memory Processor
//!
//! A `PaymentProcessor` that keeps everything in process memory.
//! Records each call and can be told to fail specific operations,
//! which is how the degrade/abort paths of the handlers are exercised.

use crate::error::{PaymentError, PaymentResult};
use crate::models::{
    Customer, EphemeralKey, NewCustomer, PaymentIntent, PaymentIntentParams, PaymentMethod,
};
use crate::processor::PaymentProcessor;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Processor operations, for call recording and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateCustomer,
    FindCustomerByEmail,
    CreatePaymentMethod,
    AttachPaymentMethod,
    SetDefaultPaymentMethod,
    CreateEphemeralKey,
    CreatePaymentIntent,
}

#[derive(Default)]
struct State {
    customers: Vec<Customer>,
    payment_methods: Vec<PaymentMethod>,
    default_methods: HashMap<String, String>,
    ephemeral_keys: Vec<(String, EphemeralKey)>,
    intents: Vec<PaymentIntentParams>,
    calls: Vec<Operation>,
    failures: HashMap<Operation, String>,
}

/// In-memory payment processor for tests
#[derive(Default)]
pub struct InMemoryProcessor {
    state: Mutex<State>,
}

impl InMemoryProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: seed an existing customer
    pub fn with_customer(self, id: impl Into<String>, email: Option<&str>) -> Self {
        self.lock().customers.push(Customer {
            id: id.into(),
            email: email.map(String::from),
            name: None,
        });
        self
    }

    /// Builder: make `operation` fail with `message`
    pub fn failing_on(self, operation: Operation, message: impl Into<String>) -> Self {
        self.lock().failures.insert(operation, message.into());
        self
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<Operation> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, operation: Operation) -> usize {
        self.lock().calls.iter().filter(|op| **op == operation).count()
    }

    pub fn customers(&self) -> Vec<Customer> {
        self.lock().customers.clone()
    }

    /// Parameters of every payment intent created
    pub fn payment_intents(&self) -> Vec<PaymentIntentParams> {
        self.lock().intents.clone()
    }

    /// Customer ids that received an ephemeral key
    pub fn ephemeral_key_customers(&self) -> Vec<String> {
        self.lock()
            .ephemeral_keys
            .iter()
            .map(|(customer, _)| customer.clone())
            .collect()
    }

    pub fn default_payment_method(&self, customer_id: &str) -> Option<String> {
        self.lock().default_methods.get(customer_id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call, then fail it if a failure was injected
    fn enter(&self, operation: Operation) -> PaymentResult<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(operation);
        if let Some(message) = state.failures.get(&operation) {
            return Err(provider_error(message.clone()));
        }
        Ok(state)
    }
}

fn provider_error(message: impl Into<String>) -> PaymentError {
    PaymentError::ProviderError {
        provider: "in_memory".to_string(),
        message: message.into(),
    }
}

fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

fn no_such_customer(customer_id: &str) -> PaymentError {
    provider_error(format!("No such customer: '{}'", customer_id))
}

#[async_trait]
impl PaymentProcessor for InMemoryProcessor {
    async fn create_customer(&self, customer: &NewCustomer) -> PaymentResult<Customer> {
        let mut state = self.enter(Operation::CreateCustomer)?;
        let created = Customer {
            id: new_id("cus"),
            email: customer.email.clone(),
            name: customer.name.clone(),
        };
        state.customers.push(created.clone());
        Ok(created)
    }

    async fn find_customer_by_email(&self, email: &str) -> PaymentResult<Option<Customer>> {
        let state = self.enter(Operation::FindCustomerByEmail)?;
        Ok(state
            .customers
            .iter()
            .find(|c| c.email.as_deref() == Some(email))
            .cloned())
    }

    async fn create_card_payment_method(&self, token: &str) -> PaymentResult<PaymentMethod> {
        let mut state = self.enter(Operation::CreatePaymentMethod)?;
        if !token.starts_with("tok_") {
            return Err(provider_error(format!("No such token: '{}'", token)));
        }
        let method = PaymentMethod {
            id: new_id("pm"),
            customer: None,
        };
        state.payment_methods.push(method.clone());
        Ok(method)
    }

    async fn attach_payment_method(
        &self,
        payment_method_id: &str,
        customer_id: &str,
    ) -> PaymentResult<PaymentMethod> {
        let mut state = self.enter(Operation::AttachPaymentMethod)?;
        if !state.customers.iter().any(|c| c.id == customer_id) {
            return Err(no_such_customer(customer_id));
        }
        let method = state
            .payment_methods
            .iter_mut()
            .find(|pm| pm.id == payment_method_id)
            .ok_or_else(|| {
                provider_error(format!("No such PaymentMethod: '{}'", payment_method_id))
            })?;
        method.customer = Some(customer_id.to_string());
        Ok(method.clone())
    }

    async fn set_default_payment_method(
        &self,
        customer_id: &str,
        payment_method_id: &str,
    ) -> PaymentResult<Customer> {
        let mut state = self.enter(Operation::SetDefaultPaymentMethod)?;
        let customer = state
            .customers
            .iter()
            .find(|c| c.id == customer_id)
            .cloned()
            .ok_or_else(|| no_such_customer(customer_id))?;
        state
            .default_methods
            .insert(customer_id.to_string(), payment_method_id.to_string());
        Ok(customer)
    }

    async fn create_ephemeral_key(&self, customer_id: &str) -> PaymentResult<EphemeralKey> {
        let mut state = self.enter(Operation::CreateEphemeralKey)?;
        if !state.customers.iter().any(|c| c.id == customer_id) {
            return Err(no_such_customer(customer_id));
        }
        let key = EphemeralKey {
            id: new_id("ephkey"),
            secret: new_id("ek_test"),
            expires_at: None,
        };
        state
            .ephemeral_keys
            .push((customer_id.to_string(), key.clone()));
        Ok(key)
    }

    async fn create_payment_intent(
        &self,
        params: &PaymentIntentParams,
    ) -> PaymentResult<PaymentIntent> {
        let mut state = self.enter(Operation::CreatePaymentIntent)?;
        let id = new_id("pi");
        state.intents.push(params.clone());
        Ok(PaymentIntent {
            client_secret: format!("{}_secret_{}", id, Uuid::new_v4().simple()),
            id,
            amount: params.amount,
            application_fee_amount: Some(params.application_fee_amount),
        })
    }

    fn provider_name(&self) -> &'static str {
        "in_memory"
    }
}
