//! Core kernel traits.
//!
//! This module defines the traits that every pipeline stage implements:
//! - `Kernel`: Base trait exposing metadata and configuration validation
//! - `BatchKernel`: Trait for kernels executed once per input batch

use crate::error::{KernelError, Result};
use crate::kernel::KernelMetadata;
use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

/// Base trait for all kernels.
pub trait Kernel: Send + Sync + Debug {
    /// Returns the kernel metadata.
    fn metadata(&self) -> &KernelMetadata;

    /// Validate kernel configuration.
    ///
    /// Called before execution to ensure configuration is valid.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Returns the kernel ID.
    fn id(&self) -> &str {
        &self.metadata().id
    }
}

/// Trait for batch kernels.
///
/// A batch kernel consumes one complete input (a transaction ledger, a built
/// graph) and produces one output. All kernels in this workspace are pure
/// functions of their input, so an execution can be retried safely.
///
/// # Type Parameters
///
/// - `I`: Input type
/// - `O`: Output type
#[async_trait]
pub trait BatchKernel<I, O>: Kernel
where
    I: Send + Sync,
    O: Send + Sync,
{
    /// Execute the kernel with the given input.
    async fn execute(&self, input: I) -> Result<O>;

    /// Validate the input before execution.
    ///
    /// Override to provide custom input validation.
    fn validate_input(&self, _input: &I) -> Result<()> {
        Ok(())
    }

    /// Execute the kernel with a timeout.
    ///
    /// # Returns
    ///
    /// The kernel output or `KernelError::Timeout`.
    async fn execute_with_timeout(&self, input: I, timeout: Duration) -> Result<O>
    where
        I: 'async_trait,
    {
        self.validate_input(&input)?;
        match tokio::time::timeout(timeout, self.execute(input)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(KernelError::Timeout(timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;

    #[derive(Debug)]
    struct SleepKernel {
        metadata: KernelMetadata,
    }

    impl SleepKernel {
        fn new() -> Self {
            Self {
                metadata: KernelMetadata::batch("test/sleep", Domain::Compliance),
            }
        }
    }

    impl Kernel for SleepKernel {
        fn metadata(&self) -> &KernelMetadata {
            &self.metadata
        }
    }

    #[async_trait]
    impl BatchKernel<u64, u64> for SleepKernel {
        async fn execute(&self, input: u64) -> Result<u64> {
            tokio::time::sleep(Duration::from_millis(input)).await;
            Ok(input)
        }

        fn validate_input(&self, input: &u64) -> Result<()> {
            if *input > 10_000 {
                return Err(KernelError::validation("sleep too long"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_execute_within_timeout() {
        let kernel = SleepKernel::new();
        let out = kernel
            .execute_with_timeout(1, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out, 1);
        assert_eq!(kernel.id(), "test/sleep");
    }

    #[tokio::test]
    async fn test_execute_times_out() {
        let kernel = SleepKernel::new();
        let err = kernel
            .execute_with_timeout(2_000, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, KernelError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_execution() {
        let kernel = SleepKernel::new();
        let err = kernel
            .execute_with_timeout(50_000, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, KernelError::ValidationError(_)));
    }
}
