use crate::entities::OrderStatus;
use crate::error::{AppError, AppResult};

impl OrderStatus {
    /// 下一个合法状态；completed 为终态
    pub fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Pending => Some(OrderStatus::Accepted),
            OrderStatus::Accepted => Some(OrderStatus::Ready),
            OrderStatus::Ready => Some(OrderStatus::Completed),
            OrderStatus::Completed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// 只允许前进到相邻的下一个状态，不可跳过、不可回退
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        self.next() == Some(target)
    }
}

pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> AppResult<()> {
    if from.can_transition_to(to) {
        return Ok(());
    }
    if from.is_terminal() {
        return Err(AppError::ValidationError(format!(
            "Order is already {from} and cannot change status"
        )));
    }
    let expected = from.next().map(|s| s.to_string()).unwrap_or_default();
    Err(AppError::ValidationError(format!(
        "Invalid status transition from {from} to {to}; next allowed status is {expected}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_chain() {
        assert!(validate_transition(OrderStatus::Pending, OrderStatus::Accepted).is_ok());
        assert!(validate_transition(OrderStatus::Accepted, OrderStatus::Ready).is_ok());
        assert!(validate_transition(OrderStatus::Ready, OrderStatus::Completed).is_ok());
    }

    #[test]
    fn test_skip_and_backward_rejected() {
        assert!(matches!(
            validate_transition(OrderStatus::Pending, OrderStatus::Ready),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            validate_transition(OrderStatus::Completed, OrderStatus::Pending),
            Err(AppError::ValidationError(_))
        ));
        assert!(validate_transition(OrderStatus::Ready, OrderStatus::Accepted).is_err());
    }

    #[test]
    fn test_same_status_rejected() {
        assert!(validate_transition(OrderStatus::Accepted, OrderStatus::Accepted).is_err());
    }

    #[test]
    fn test_completed_is_terminal() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }
}
