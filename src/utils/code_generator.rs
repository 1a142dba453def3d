use rand::Rng;
use uuid::Uuid;

/// 去掉易混淆字符 (0/O, 1/I/L)
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 6;

/// 生成可读的券码，如 `SPIN-7KQ2XZ`
pub fn generate_voucher_code(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let body: String = (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    format!("{prefix}-{body}")
}

/// 每次抽奖请求唯一的幂等键
pub fn generate_spin_reference(user_id: i64) -> String {
    format!("SPIN-{user_id}-{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voucher_code_shape() {
        let code = generate_voucher_code("SPIN");
        let (prefix, body) = code.split_once('-').unwrap();
        assert_eq!(prefix, "SPIN");
        assert_eq!(body.len(), CODE_LEN);
        assert!(body.bytes().all(|b| CODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn spin_references_are_unique_per_attempt() {
        let a = generate_spin_reference(7);
        let b = generate_spin_reference(7);
        assert!(a.starts_with("SPIN-7-"));
        assert_ne!(a, b);
    }
}
