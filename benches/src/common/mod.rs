/// Generate an orders CSV for one day
///
/// Every `skip_every`-th row is cancelled and every third row is in USD, so
/// the transform exercises both the skip and the conversion path.
pub fn generate_orders_csv(num_orders: usize, skip_every: usize) -> String {
    let mut csv =
        String::from("order_id,user_id,order_datetime,amount,currency,status,item_count\n");

    for i in 0..num_orders {
        let status = if skip_every > 0 && i % skip_every == 0 {
            "CANCELLED"
        } else {
            "PAID"
        };
        let (currency, amount) = if i % 3 == 0 {
            ("USD", (i % 50) + 1)
        } else {
            ("KRW", (i % 1000) * 100 + 100)
        };
        csv.push_str(&format!(
            "O-{:07},{},2025-01-01 {:02}:{:02}:{:02},{},{},{},{}\n",
            i,
            (i % 500) + 1,
            (i / 3600) % 24,
            (i / 60) % 60,
            i % 60,
            amount,
            currency,
            status,
            (i % 5) + 1
        ));
    }

    csv
}
