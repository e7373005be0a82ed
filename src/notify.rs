use crate::models::Reservation;

/// Outbound customer notifications. Delivery is best effort; failures never
/// reach the caller.
pub trait ReservationNotifier: Send + Sync {
    fn reservation_created(&self, reservation: &Reservation);
    fn reservation_cancelled(&self, reservation: &Reservation);
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl ReservationNotifier for LogNotifier {
    fn reservation_created(&self, reservation: &Reservation) {
        tracing::info!(
            code = %reservation.code,
            email = %reservation.email,
            date_time = %reservation.date_time,
            "reservation confirmation queued"
        );
    }

    fn reservation_cancelled(&self, reservation: &Reservation) {
        tracing::info!(
            code = %reservation.code,
            email = %reservation.email,
            "reservation cancellation notice queued"
        );
    }
}
