//! Recommendation texts shown to reviewers (Vietnamese, as used by the
//! reward platform UI).

use crate::performance::PerformanceLevel;
use crate::sentiment::Sentiment;

fn mentions(key_points: &[String], terms: &[&str]) -> bool {
    let joined = key_points.join(" ");
    terms.iter().any(|t| joined.contains(t))
}

pub fn feedback_recommendations(
    sentiment: Sentiment,
    key_points: &[String],
    source: &str,
) -> Vec<String> {
    let mut out = Vec::new();
    match sentiment {
        Sentiment::Positive => {
            out.push("Chia sẻ phản hồi tích cực này với nhân viên để ghi nhận.".to_string());
            if mentions(key_points, &["teamwork", "đồng đội"]) {
                out.push("Khen ngợi tinh thần hợp tác và làm việc nhóm.".to_string());
            }
            out.push("Lưu trữ phản hồi này cho kỳ đánh giá hiệu suất tiếp theo.".to_string());
        }
        Sentiment::Negative => {
            out.push(format!(
                "Cần xem xét kỹ các điểm chính trong phản hồi từ {source}."
            ));
            out.push("Lên lịch một cuộc trao đổi riêng với nhân viên để làm rõ vấn đề.".to_string());
            if key_points.is_empty() {
                out.push("Yêu cầu thêm thông tin chi tiết về các vấn đề được đề cập.".to_string());
            } else {
                out.push(
                    "Sử dụng các điểm chính đã trích xuất làm cơ sở cho cuộc thảo luận."
                        .to_string(),
                );
            }
        }
        Sentiment::Neutral => {
            out.push("Ghi nhận phản hồi và tiếp tục theo dõi hiệu suất.".to_string());
            if mentions(key_points, &["cải thiện", "improve"]) {
                out.push(
                    "Xác định các lĩnh vực cần cải thiện được đề cập và tạo kế hoạch phát triển."
                        .to_string(),
                );
            }
        }
    }
    out
}

pub fn level_recommendations(level: PerformanceLevel) -> &'static [&'static str] {
    match level {
        PerformanceLevel::Excellent => &[
            "Xem xét thăng chức hoặc tăng thưởng",
            "Ghi nhận thành tích xuất sắc công khai",
            "Giao nhiệm vụ quan trọng hơn để phát huy tiềm năng",
        ],
        PerformanceLevel::Good => &[
            "Duy trì mức hiệu suất hiện tại",
            "Cung cấp phản hồi tích cực",
            "Xác định cơ hội phát triển kỹ năng",
        ],
        PerformanceLevel::Average => &[
            "Đặt mục tiêu hiệu suất cụ thể",
            "Cung cấp đào tạo bổ sung",
            "Theo dõi tiến độ thường xuyên",
        ],
        PerformanceLevel::BelowAverage => &[
            "Lên lịch họp cải thiện hiệu suất",
            "Xác định các lĩnh vực cần cải thiện",
            "Cung cấp hướng dẫn và hỗ trợ thêm",
        ],
        PerformanceLevel::Poor => &[
            "Phát triển kế hoạch cải thiện hiệu suất",
            "Đặt mục tiêu ngắn hạn và dài hạn",
            "Theo dõi chặt chẽ và đánh giá thường xuyên",
        ],
    }
}

/// Unknown roles get no role-specific advice.
pub fn role_recommendations(role: &str) -> &'static [&'static str] {
    match role {
        "developer" => &[
            "Tham gia các dự án phát triển kỹ năng kỹ thuật",
            "Cập nhật kiến thức về công nghệ mới",
        ],
        "marketing_specialist" => &[
            "Phân tích xu hướng thị trường mới nhất",
            "Phát triển chiến lược tiếp thị sáng tạo",
        ],
        "direct_mentor" => &[
            "Tăng cường kỹ năng huấn luyện và phát triển",
            "Xây dựng kế hoạch phát triển cho từng nhân viên",
        ],
        "indirect_mentor" => &[
            "Chia sẻ kiến thức chuyên môn rộng rãi",
            "Tạo cơ hội học tập cho nhóm",
        ],
        "hr_recruiter" => &[
            "Cải thiện quy trình tuyển dụng",
            "Phát triển chiến lược giữ chân nhân tài",
        ],
        "business_development" => &[
            "Mở rộng mạng lưới đối tác",
            "Xác định cơ hội kinh doanh mới",
        ],
        _ => &[],
    }
}

pub fn performance_recommendations(level: PerformanceLevel, role: &str) -> Vec<String> {
    level_recommendations(level)
        .iter()
        .chain(role_recommendations(role))
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_teamwork_adds_praise() {
        let kp = vec!["Great teamwork on the release.".to_string()];
        let r = feedback_recommendations(Sentiment::Positive, &kp, "client");
        assert_eq!(r.len(), 3);
        assert!(r[1].contains("làm việc nhóm"));
    }

    #[test]
    fn negative_mentions_source_and_key_point_state() {
        let r = feedback_recommendations(Sentiment::Negative, &[], "manager");
        assert!(r[0].ends_with("từ manager."));
        assert!(r[2].starts_with("Yêu cầu thêm"));

        let kp = vec!["Missed two deadlines.".to_string()];
        let r = feedback_recommendations(Sentiment::Negative, &kp, "peer");
        assert!(r[2].starts_with("Sử dụng"));
    }

    #[test]
    fn neutral_improvement_hint() {
        let kp = vec!["Needs to improve communication.".to_string()];
        assert_eq!(feedback_recommendations(Sentiment::Neutral, &kp, "peer").len(), 2);
        assert_eq!(feedback_recommendations(Sentiment::Neutral, &[], "peer").len(), 1);
    }

    #[test]
    fn role_advice_appended_for_known_roles() {
        assert_eq!(performance_recommendations(PerformanceLevel::Good, "developer").len(), 5);
        assert_eq!(performance_recommendations(PerformanceLevel::Poor, "intern").len(), 3);
    }
}
